//! Fungible governance token
//!
//! Balance-weighted voting power with delegation, plus an owner managed
//! claim list that lets accounts mint up to an allowance.

use dao_core::{Address, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::delegation::VotesLedger;
use crate::error::{Result, TokenError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceToken {
    address: Address,
    name: String,
    symbol: String,
    owner: Address,
    balances: BTreeMap<Address, u128>,
    claim_list: BTreeMap<Address, u128>,
    votes: VotesLedger,
}

impl GovernanceToken {
    /// Deploy the token, minting `initial_supply` to `owner`.
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        owner: Address,
        initial_supply: u128,
        block: BlockNumber,
    ) -> Self {
        let mut token = Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            owner,
            balances: BTreeMap::new(),
            claim_list: BTreeMap::new(),
            votes: VotesLedger::new(),
        };
        token.mint(owner, initial_supply, block);
        token
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

    pub fn total_supply(&self) -> u128 {
        self.votes.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
        block: BlockNumber,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(TokenError::TransferToZero);
        }
        let available = self.balance_of(&from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        self.balances.insert(from, available - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        self.votes
            .transfer_voting_units(Some(&from), Some(&to), amount, block);
        Ok(())
    }

    fn mint(&mut self, to: Address, amount: u128, block: BlockNumber) {
        *self.balances.entry(to).or_insert(0) += amount;
        self.votes.transfer_voting_units(None, Some(&to), amount, block);
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

    /// Allow each of `accounts` to claim up to `amount` new tokens.
    pub fn set_claim_list(&mut self, caller: &Address, accounts: &[Address], amount: u128) -> Result<()> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner);
        }
        for account in accounts {
            self.claim_list.insert(*account, amount);
        }
        Ok(())
    }

    pub fn amount_available_to_claim(&self, account: &Address) -> u128 {
        self.claim_list.get(account).copied().unwrap_or(0)
    }

    pub fn claim(&mut self, caller: Address, amount: u128, block: BlockNumber) -> Result<()> {
        let available = self.amount_available_to_claim(&caller);
        if amount > available {
            return Err(TokenError::ExceededClaim {
                requested: amount,
                available,
            });
        }
        self.claim_list.insert(caller, available - amount);
        self.mint(caller, amount, block);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner);
        }
        self.owner = new_owner;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_core::TOKEN_UNIT;

    fn token() -> (GovernanceToken, Address) {
        let owner = Address::from_label("owner");
        let token = GovernanceToken::new(
            Address::from_label("token"),
            "Governor Token",
            "GT",
            owner,
            1_000 * TOKEN_UNIT,
            0,
        );
        (token, owner)
    }

    #[test]
    fn test_initial_supply_goes_to_owner() {
        let (token, owner) = token();
        assert_eq!(token.total_supply(), 1_000 * TOKEN_UNIT);
        assert_eq!(token.balance_of(&owner), 1_000 * TOKEN_UNIT);
        assert_eq!(token.votes().get_votes(&owner), 0);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (mut token, _) = token();
        let alice = Address::from_label("alice");
        let err = token
            .transfer(alice, Address::from_label("bob"), 1, 1)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientBalance {
                requested: 1,
                available: 0
            }
        );
    }

    #[test]
    fn test_claim_in_two_steps() {
        let (mut token, owner) = token();
        let alice = Address::from_label("alice");
        token.set_claim_list(&owner, &[alice], 100).unwrap();

        token.claim(alice, 50, 1).unwrap();
        token.claim(alice, 50, 2).unwrap();
        assert_eq!(token.balance_of(&alice), 100);
        assert_eq!(token.amount_available_to_claim(&alice), 0);
        assert!(matches!(
            token.claim(alice, 1, 3),
            Err(TokenError::ExceededClaim { .. })
        ));
    }

    #[test]
    fn test_claim_list_owner_only() {
        let (mut token, _) = token();
        let alice = Address::from_label("alice");
        assert_eq!(
            token.set_claim_list(&alice, &[alice], 100),
            Err(TokenError::NotOwner)
        );
    }
}
