//! Treasury error types

use dao_core::{Address, Revert};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Ownable: caller is not the owner")]
    NotOwner,

    #[error("Insufficient treasury balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("Cannot release funds to the zero address")]
    ReleaseToZero,

    #[error("Ownable: new owner is the zero address")]
    OwnerIsZero,

    #[error("Unauthorized caller {0}")]
    Unauthorized(Address),
}

impl From<TreasuryError> for Revert {
    fn from(err: TreasuryError) -> Self {
        Revert::Message(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
