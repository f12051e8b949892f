//! Voting power sources
//!
//! The governor weighs proposals against a [`VotingPowerSource`]. Both token
//! kinds implement it; [`VotingToken`] is the tagged variant stored in a
//! [`TokenLedger`], and the governor resolves a proposal's pinned source
//! through the [`SourceRegistry`] lookup.

use dao_core::{Address, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, TokenError};
use crate::nft::GovernanceNft;
use crate::token::GovernanceToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Weight is the delegated token balance
    Fungible,
    /// Weight is the delegated number of collection items
    NonFungible,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Fungible => write!(f, "fungible"),
            SourceKind::NonFungible => write!(f, "non-fungible"),
        }
    }
}

pub trait VotingPowerSource {
    fn source_address(&self) -> Address;

    fn kind(&self) -> SourceKind;

    /// Current delegated votes of `account`
    fn get_votes(&self, account: &Address) -> u128;

    /// Delegated votes of `account` at the end of `block`
    fn get_past_votes(&self, account: &Address, block: BlockNumber) -> u128;

    /// Total supply at the end of `block`
    fn get_past_total_supply(&self, block: BlockNumber) -> u128;
}

/// Lookup of voting power sources by token address.
pub trait SourceRegistry {
    fn source(&self, token: &Address) -> Option<&dyn VotingPowerSource>;
}

impl VotingPowerSource for GovernanceToken {
    fn source_address(&self) -> Address {
        self.address()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Fungible
    }

    fn get_votes(&self, account: &Address) -> u128 {
        self.votes().get_votes(account)
    }

    fn get_past_votes(&self, account: &Address, block: BlockNumber) -> u128 {
        self.votes().get_past_votes(account, block)
    }

    fn get_past_total_supply(&self, block: BlockNumber) -> u128 {
        self.votes().get_past_total_supply(block)
    }
}

impl VotingPowerSource for GovernanceNft {
    fn source_address(&self) -> Address {
        self.address()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::NonFungible
    }

    fn get_votes(&self, account: &Address) -> u128 {
        self.votes().get_votes(account)
    }

    fn get_past_votes(&self, account: &Address, block: BlockNumber) -> u128 {
        self.votes().get_past_votes(account, block)
    }

    fn get_past_total_supply(&self, block: BlockNumber) -> u128 {
        self.votes().get_past_total_supply(block)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingToken {
    Fungible(GovernanceToken),
    NonFungible(GovernanceNft),
}

impl VotingToken {
    fn inner(&self) -> &dyn VotingPowerSource {
        match self {
            VotingToken::Fungible(t) => t as &dyn VotingPowerSource,
            VotingToken::NonFungible(n) => n as &dyn VotingPowerSource,
        }
    }

    pub fn delegate(&mut self, account: Address, delegatee: Address, block: BlockNumber) {
        match self {
            VotingToken::Fungible(t) => t.delegate(account, delegatee, block),
            VotingToken::NonFungible(n) => n.delegate(account, delegatee, block),
        }
    }

    pub fn delegates(&self, account: &Address) -> Option<Address> {
        match self {
            VotingToken::Fungible(t) => t.delegates(account),
            VotingToken::NonFungible(n) => n.delegates(account),
        }
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        match self {
            VotingToken::Fungible(t) => t.balance_of(account),
            VotingToken::NonFungible(n) => n.balance_of(account),
        }
    }

    pub fn total_supply(&self) -> u128 {
        match self {
            VotingToken::Fungible(t) => t.total_supply(),
            VotingToken::NonFungible(n) => n.total_supply(),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            VotingToken::Fungible(t) => t.symbol(),
            VotingToken::NonFungible(n) => n.symbol(),
        }
    }
}

impl VotingPowerSource for VotingToken {
    fn source_address(&self) -> Address {
        self.inner().source_address()
    }

    fn kind(&self) -> SourceKind {
        self.inner().kind()
    }

    fn get_votes(&self, account: &Address) -> u128 {
        self.inner().get_votes(account)
    }

    fn get_past_votes(&self, account: &Address, block: BlockNumber) -> u128 {
        self.inner().get_past_votes(account, block)
    }

    fn get_past_total_supply(&self, block: BlockNumber) -> u128 {
        self.inner().get_past_total_supply(block)
    }
}

impl From<GovernanceToken> for VotingToken {
    fn from(token: GovernanceToken) -> Self {
        VotingToken::Fungible(token)
    }
}

impl From<GovernanceNft> for VotingToken {
    fn from(nft: GovernanceNft) -> Self {
        VotingToken::NonFungible(nft)
    }
}

/// All deployed voting tokens, keyed by address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    tokens: BTreeMap<Address, VotingToken>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<VotingToken>) -> Address {
        let token = token.into();
        let address = token.source_address();
        log::debug!("registered {} source {} ({})", token.kind(), address.short(), token.symbol());
        self.tokens.insert(address, token);
        address
    }

    pub fn get(&self, token: &Address) -> Result<&VotingToken> {
        self.tokens.get(token).ok_or(TokenError::UnknownToken(*token))
    }

    pub fn get_mut(&mut self, token: &Address) -> Result<&mut VotingToken> {
        self.tokens
            .get_mut(token)
            .ok_or(TokenError::UnknownToken(*token))
    }

    pub fn fungible_mut(&mut self, token: &Address) -> Result<&mut GovernanceToken> {
        match self.get_mut(token)? {
            VotingToken::Fungible(t) => Ok(t),
            VotingToken::NonFungible(_) => Err(TokenError::WrongKind(*token, "fungible")),
        }
    }

    pub fn nft_mut(&mut self, token: &Address) -> Result<&mut GovernanceNft> {
        match self.get_mut(token)? {
            VotingToken::NonFungible(n) => Ok(n),
            VotingToken::Fungible(_) => Err(TokenError::WrongKind(*token, "non-fungible")),
        }
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.tokens.keys()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl SourceRegistry for TokenLedger {
    fn source(&self, token: &Address) -> Option<&dyn VotingPowerSource> {
        self.tokens.get(token).map(|t| t as &dyn VotingPowerSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_lookup_by_kind() {
        let owner = Address::from_label("owner");
        let mut ledger = TokenLedger::new();
        let ft = ledger.insert(GovernanceToken::new(Address::from_label("gt"), "Governor Token", "GT", owner, 10, 0));
        let nft = ledger.insert(GovernanceNft::new(Address::from_label("gnft"), "Governance NFT", "GNFT", 10, owner));

        assert!(ledger.fungible_mut(&ft).is_ok());
        assert!(ledger.nft_mut(&nft).is_ok());
        assert_eq!(
            ledger.fungible_mut(&nft).unwrap_err(),
            TokenError::WrongKind(nft, "fungible")
        );
        assert_eq!(ledger.source(&ft).unwrap().kind(), SourceKind::Fungible);
        assert!(ledger.source(&Address::from_label("missing")).is_none());
    }

    #[test]
    fn test_ledger_serde_keeps_variant() {
        let owner = Address::from_label("owner");
        let mut ledger = TokenLedger::new();
        let nft = ledger.insert(GovernanceNft::new(Address::from_label("gnft"), "Governance NFT", "GNFT", 10, owner));
        let json = serde_json::to_string(&ledger).unwrap();
        let back: TokenLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&nft).unwrap().kind(), SourceKind::NonFungible);
    }
}
