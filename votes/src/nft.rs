//! Non-fungible governance collection
//!
//! One token is one vote. The owner can reserve tokens for itself and
//! allow-list minters; supply is capped at `max_supply`.

use dao_core::{Address, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::delegation::VotesLedger;
use crate::error::{Result, TokenError};

pub type TokenId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceNft {
    address: Address,
    name: String,
    symbol: String,
    owner: Address,
    max_supply: u64,
    base_uri: String,
    next_token_id: TokenId,
    owners: BTreeMap<TokenId, Address>,
    owned: BTreeMap<Address, Vec<TokenId>>,
    allow_list: BTreeMap<Address, u32>,
    votes: VotesLedger,
}

impl GovernanceNft {
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        max_supply: u64,
        owner: Address,
    ) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            owner,
            max_supply,
            base_uri: String::new(),
            next_token_id: 0,
            owners: BTreeMap::new(),
            owned: BTreeMap::new(),
            allow_list: BTreeMap::new(),
            votes: VotesLedger::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn max_supply(&self) -> u64 {
        self.max_supply
    }

    pub fn total_supply(&self) -> u128 {
        self.votes.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.owned.get(account).map(|ids| ids.len() as u128).unwrap_or(0)
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(TokenError::NonexistentToken(token_id))
    }

    pub fn token_of_owner_by_index(&self, owner: &Address, index: usize) -> Result<TokenId> {
        self.owned
            .get(owner)
            .and_then(|ids| ids.get(index))
            .copied()
            .ok_or(TokenError::OwnerIndexOutOfBounds {
                owner: *owner,
                index,
            })
    }

    fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner);
        }
        Ok(())
    }

    fn mint_batch(&mut self, to: Address, count: u64, block: BlockNumber) -> Result<()> {
        let end = self.next_token_id.checked_add(count);
        if end.map_or(true, |end| end > self.max_supply) {
            return Err(TokenError::ExceededMaxSupply {
                max_supply: self.max_supply,
            });
        }
        for _ in 0..count {
            let id = self.next_token_id;
            self.next_token_id += 1;
            self.owners.insert(id, to);
            self.owned.entry(to).or_default().push(id);
        }
        self.votes
            .transfer_voting_units(None, Some(&to), count as u128, block);
        Ok(())
    }

    /// Owner mints `count` tokens to itself.
    pub fn reserve(&mut self, caller: &Address, count: u64, block: BlockNumber) -> Result<()> {
        self.ensure_owner(caller)?;
        self.mint_batch(*caller, count, block)
    }

    pub fn set_allow_list(&mut self, caller: &Address, accounts: &[Address], allowed: u32) -> Result<()> {
        self.ensure_owner(caller)?;
        for account in accounts {
            self.allow_list.insert(*account, allowed);
        }
        Ok(())
    }

    pub fn num_available_to_mint(&self, account: &Address) -> u32 {
        self.allow_list.get(account).copied().unwrap_or(0)
    }

    /// Mint one token against the caller's allow-list allowance.
    pub fn mint(&mut self, caller: Address, block: BlockNumber) -> Result<TokenId> {
        let available = self.num_available_to_mint(&caller);
        if available == 0 {
            return Err(TokenError::ExceededMaxMint);
        }
        let id = self.next_token_id;
        self.mint_batch(caller, 1, block)?;
        self.allow_list.insert(caller, available - 1);
        Ok(id)
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: Address,
        to: Address,
        token_id: TokenId,
        block: BlockNumber,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(TokenError::TransferToZero);
        }
        let holder = self.owner_of(token_id)?;
        if holder != from || *caller != from {
            return Err(TokenError::NotTokenOwner {
                token_id,
                account: *caller,
            });
        }
        if let Some(ids) = self.owned.get_mut(&from) {
            ids.retain(|id| *id != token_id);
        }
        self.owned.entry(to).or_default().push(token_id);
        self.owners.insert(token_id, to);
        self.votes.transfer_voting_units(Some(&from), Some(&to), 1, block);
        Ok(())
    }

    /// Transfer the first `count` tokens `from` holds.
    pub fn transfer_many(
        &mut self,
        from: Address,
        to: Address,
        count: u64,
        block: BlockNumber,
    ) -> Result<()> {
        let held = self.balance_of(&from);
        if held < count as u128 {
            return Err(TokenError::InsufficientBalance {
                requested: count as u128,
                available: held,
            });
        }
        for _ in 0..count {
            let id = self.token_of_owner_by_index(&from, 0)?;
            self.transfer_from(&from, from, to, id, block)?;
        }
        Ok(())
    }

    pub fn delegate(&mut self, account: Address, delegatee: Address, block: BlockNumber) {
        let units = self.balance_of(&account);
        self.votes.delegate(account, delegatee, units, block);
    }

    pub fn delegates(&self, account: &Address) -> Option<Address> {
        self.votes.delegates(account)
    }

    pub fn votes(&self) -> &VotesLedger {
        &self.votes
    }

    pub fn set_base_uri(&mut self, caller: &Address, uri: impl Into<String>) -> Result<()> {
        self.ensure_owner(caller)?;
        self.base_uri = uri.into();
        Ok(())
    }

    pub fn token_uri(&self, token_id: TokenId) -> Result<String> {
        self.owner_of(token_id)?;
        Ok(format!("{}{}", self.base_uri, token_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(max_supply: u64) -> (GovernanceNft, Address) {
        let owner = Address::from_label("owner");
        let nft = GovernanceNft::new(Address::from_label("nft"), "Governance NFT", "GNFT", max_supply, owner);
        (nft, owner)
    }

    #[test]
    fn test_reserve_by_owner() {
        let (mut nft, owner) = collection(100);
        nft.reserve(&owner, 10, 1).unwrap();
        assert_eq!(nft.balance_of(&owner), 10);
        assert_eq!(nft.total_supply(), 10);
    }

    #[test]
    fn test_reserve_not_owner() {
        let (mut nft, _) = collection(100);
        let other = Address::from_label("other");
        assert_eq!(nft.reserve(&other, 10, 1), Err(TokenError::NotOwner));
    }

    #[test]
    fn test_mint_allowance() {
        let (mut nft, owner) = collection(100);
        let minter = Address::from_label("minter");
        assert_eq!(nft.mint(minter, 1), Err(TokenError::ExceededMaxMint));

        nft.set_allow_list(&owner, &[minter], 5).unwrap();
        assert_eq!(nft.num_available_to_mint(&minter), 5);
        for _ in 0..5 {
            nft.mint(minter, 1).unwrap();
        }
        assert_eq!(nft.balance_of(&minter), 5);
        assert_eq!(nft.mint(minter, 1), Err(TokenError::ExceededMaxMint));
    }

    #[test]
    fn test_mint_after_max_supply() {
        let (mut nft, owner) = collection(10);
        let minter = Address::from_label("minter");
        nft.reserve(&owner, 10, 1).unwrap();
        nft.set_allow_list(&owner, &[minter], 5).unwrap();
        assert_eq!(
            nft.mint(minter, 2),
            Err(TokenError::ExceededMaxSupply { max_supply: 10 })
        );
        assert_eq!(nft.num_available_to_mint(&minter), 5);
    }

    #[test]
    fn test_reserve_count_overflowing_supply() {
        let (mut nft, owner) = collection(10);
        nft.reserve(&owner, 1, 1).unwrap();
        assert_eq!(
            nft.reserve(&owner, u64::MAX, 1),
            Err(TokenError::ExceededMaxSupply { max_supply: 10 })
        );
        assert_eq!(nft.total_supply(), 1);
    }

    #[test]
    fn test_token_uri_uses_base() {
        let (mut nft, owner) = collection(10);
        let minter = Address::from_label("minter");
        nft.set_base_uri(&owner, "ipfs://base/").unwrap();
        nft.set_allow_list(&owner, &[minter], 1).unwrap();
        let id = nft.mint(minter, 1).unwrap();
        assert_eq!(id as u128, nft.total_supply() - 1);
        assert_eq!(nft.token_uri(id).unwrap(), format!("ipfs://base/{}", id));
        assert_eq!(nft.token_uri(99), Err(TokenError::NonexistentToken(99)));
    }

    #[test]
    fn test_transfer_moves_delegated_votes() {
        let (mut nft, owner) = collection(10);
        let bob = Address::from_label("bob");
        nft.reserve(&owner, 3, 1).unwrap();
        nft.delegate(owner, owner, 1);
        nft.delegate(bob, bob, 1);

        nft.transfer_many(owner, bob, 2, 2).unwrap();
        assert_eq!(nft.votes().get_votes(&owner), 1);
        assert_eq!(nft.votes().get_votes(&bob), 2);
        assert_eq!(nft.votes().get_past_votes(&owner, 1), 3);
    }

    #[test]
    fn test_transfer_requires_holder() {
        let (mut nft, owner) = collection(10);
        let thief = Address::from_label("thief");
        nft.reserve(&owner, 1, 1).unwrap();
        assert!(matches!(
            nft.transfer_from(&thief, owner, thief, 0, 2),
            Err(TokenError::NotTokenOwner { .. })
        ));
    }
}
