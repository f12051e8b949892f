//! DAO Voting Power Sources
//!
//! Checkpointed, delegated voting power backed either by a fungible token
//! balance or by a count of non-fungible collection items.

pub mod checkpoints;
pub mod delegation;
pub mod error;
pub mod nft;
pub mod source;
pub mod token;

pub use checkpoints::{Checkpoint, Checkpoints};
pub use delegation::VotesLedger;
pub use error::{Result, TokenError};
pub use nft::{GovernanceNft, TokenId};
pub use source::{SourceKind, SourceRegistry, TokenLedger, VotingPowerSource, VotingToken};
pub use token::GovernanceToken;
