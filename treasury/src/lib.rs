//! DAO Treasury Module
//!
//! The treasury contract governance proposals act on. It receives funds,
//! counts executed proposals and releases funds to recipients, all gated on
//! its owner, which is the governor or its timelock.

pub mod error;
pub mod treasury;

pub use error::{Result, TreasuryError};
pub use treasury::{Release, Treasury, EXECUTE_SIGNATURE, RELEASE_SIGNATURE};
