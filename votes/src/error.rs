//! Voting token error types

use dao_core::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Ownable: caller is not the owner")]
    NotOwner,

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("Exceeded max available to claim: requested {requested}, available {available}")]
    ExceededClaim { requested: u128, available: u128 },

    #[error("Exceeded max available to mint")]
    ExceededMaxMint,

    #[error("Exceeded max supply of {max_supply}")]
    ExceededMaxSupply { max_supply: u64 },

    #[error("Token {0} does not exist")]
    NonexistentToken(u64),

    #[error("Token {token_id} is not owned by {account}")]
    NotTokenOwner { token_id: u64, account: Address },

    #[error("Owner index {index} out of bounds for {owner}")]
    OwnerIndexOutOfBounds { owner: Address, index: usize },

    #[error("Transfer to the zero address")]
    TransferToZero,

    #[error("Unknown voting token: {0}")]
    UnknownToken(Address),

    #[error("Token {0} is not a {1} token")]
    WrongKind(Address, &'static str),
}

pub type Result<T> = std::result::Result<T, TokenError>;
