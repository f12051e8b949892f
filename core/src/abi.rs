//! Minimal contract-call encoding
//!
//! Calldata is a 4-byte function selector (`keccak256(signature)[..4]`)
//! followed by 32-byte argument words. Only the two argument kinds the
//! governor's targets need are supported: addresses and unsigned integers.

use thiserror::Error;

use crate::address::{Address, ADDRESS_LEN};
use crate::hash::keccak256;

pub const SELECTOR_LEN: usize = 4;
pub const WORD_LEN: usize = 32;

pub type Selector = [u8; SELECTOR_LEN];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(u128),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("calldata shorter than a selector ({0} bytes)")]
    MissingSelector(usize),

    #[error("argument {index} out of range")]
    MissingArgument { index: usize },

    #[error("argument {index} is not a valid {kind}")]
    InvalidArgument { index: usize, kind: &'static str },
}

pub fn selector(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    let mut out = [0u8; SELECTOR_LEN];
    out.copy_from_slice(&digest.0[..SELECTOR_LEN]);
    out
}

pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(SELECTOR_LEN + args.len() * WORD_LEN);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&encode_word(arg));
    }
    data
}

fn encode_word(token: &Token) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    match token {
        Token::Address(addr) => word[WORD_LEN - ADDRESS_LEN..].copy_from_slice(addr.as_bytes()),
        Token::Uint(v) => word[WORD_LEN - 16..].copy_from_slice(&v.to_be_bytes()),
    }
    word
}

/// Borrowed view over calldata split into selector and argument words.
#[derive(Debug, Clone, Copy)]
pub struct Calldata<'a> {
    pub selector: Selector,
    args: &'a [u8],
}

impl<'a> Calldata<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, AbiError> {
        if data.len() < SELECTOR_LEN {
            return Err(AbiError::MissingSelector(data.len()));
        }
        let mut selector = [0u8; SELECTOR_LEN];
        selector.copy_from_slice(&data[..SELECTOR_LEN]);
        Ok(Self {
            selector,
            args: &data[SELECTOR_LEN..],
        })
    }

    pub fn is(&self, signature: &str) -> bool {
        self.selector == selector(signature)
    }

    fn word(&self, index: usize) -> Result<&'a [u8], AbiError> {
        let start = index * WORD_LEN;
        self.args
            .get(start..start + WORD_LEN)
            .ok_or(AbiError::MissingArgument { index })
    }

    pub fn address(&self, index: usize) -> Result<Address, AbiError> {
        let word = self.word(index)?;
        let (padding, body) = word.split_at(WORD_LEN - ADDRESS_LEN);
        if padding.iter().any(|b| *b != 0) {
            return Err(AbiError::InvalidArgument { index, kind: "address" });
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(body);
        Ok(Address::new(bytes))
    }

    pub fn uint(&self, index: usize) -> Result<u128, AbiError> {
        let word = self.word(index)?;
        let (high, low) = word.split_at(WORD_LEN - 16);
        if high.iter().any(|b| *b != 0) {
            return Err(AbiError::InvalidArgument { index, kind: "uint128" });
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(low);
        Ok(u128::from_be_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_known_value() {
        // transfer(address,uint256)
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn test_encode_and_read_arguments() {
        let to = Address::from_label("recipient");
        let data = encode_call("release(address,uint256)", &[Token::Address(to), Token::Uint(42)]);
        assert_eq!(data.len(), SELECTOR_LEN + 2 * WORD_LEN);

        let call = Calldata::parse(&data).unwrap();
        assert!(call.is("release(address,uint256)"));
        assert!(!call.is("execute()"));
        assert_eq!(call.address(0).unwrap(), to);
        assert_eq!(call.uint(1).unwrap(), 42);
        assert_eq!(call.uint(2), Err(AbiError::MissingArgument { index: 2 }));
    }

    #[test]
    fn test_short_calldata_rejected() {
        assert_eq!(Calldata::parse(&[1, 2]).unwrap_err(), AbiError::MissingSelector(2));
    }
}
