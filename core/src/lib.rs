//! DAO Core Library
//!
//! Shared primitives for the governor workspace: addresses, hashing,
//! calldata encoding, the block clock and contract call plumbing.

pub mod abi;
pub mod address;
pub mod block;
pub mod contract;
pub mod hash;

pub use abi::{encode_call, selector, AbiError, Calldata, Token};
pub use address::{Address, AddressError};
pub use block::{Block, BlockNumber, Chain};
pub use contract::{Call, CallExecutor, Contract, ContractRegistry, Revert};
pub use hash::{keccak256, keccak256_concat, H256};

/// Decimal places of the fungible governance token
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units
pub const TOKEN_UNIT: u128 = 10u128.pow(TOKEN_DECIMALS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_unit() {
        assert_eq!(TOKEN_UNIT, 1_000_000_000_000_000_000);
    }
}
