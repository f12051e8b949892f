//! Delegated voting power ledger
//!
//! Shared by the fungible and non-fungible tokens. An account's voting
//! units (balance or NFT count) only count as votes once the account has
//! picked a delegate, which may be itself.

use dao_core::{Address, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::checkpoints::Checkpoints;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VotesLedger {
    delegates: BTreeMap<Address, Address>,
    delegate_checkpoints: BTreeMap<Address, Checkpoints>,
    total_supply: Checkpoints,
}

impl VotesLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delegates(&self, account: &Address) -> Option<Address> {
        self.delegates.get(account).copied()
    }

    /// Point `account`'s `units` at `delegatee`, moving votes away from the
    /// previous delegate.
    pub fn delegate(
        &mut self,
        account: Address,
        delegatee: Address,
        units: u128,
        block: BlockNumber,
    ) -> Option<Address> {
        let previous = self.delegates.insert(account, delegatee);
        self.move_delegate_votes(previous, Some(delegatee), units, block);
        log::debug!(
            "{} delegated {} unit(s) to {} at block {}",
            account.short(),
            units,
            delegatee.short(),
            block
        );
        previous
    }

    /// Account for a transfer of voting units. `None` on the sending side
    /// is a mint, `None` on the receiving side is a burn.
    pub fn transfer_voting_units(
        &mut self,
        from: Option<&Address>,
        to: Option<&Address>,
        amount: u128,
        block: BlockNumber,
    ) {
        if from.is_none() {
            let total = self.total_supply.latest().saturating_add(amount);
            self.total_supply.push(block, total);
        }
        if to.is_none() {
            let total = self.total_supply.latest().saturating_sub(amount);
            self.total_supply.push(block, total);
        }
        let from_delegate = from.and_then(|a| self.delegates(a));
        let to_delegate = to.and_then(|a| self.delegates(a));
        self.move_delegate_votes(from_delegate, to_delegate, amount, block);
    }

    fn move_delegate_votes(
        &mut self,
        from: Option<Address>,
        to: Option<Address>,
        amount: u128,
        block: BlockNumber,
    ) {
        if from == to || amount == 0 {
            return;
        }
        if let Some(src) = from {
            let cp = self.delegate_checkpoints.entry(src).or_default();
            let next = cp.latest().saturating_sub(amount);
            cp.push(block, next);
        }
        if let Some(dst) = to {
            let cp = self.delegate_checkpoints.entry(dst).or_default();
            let next = cp.latest().saturating_add(amount);
            cp.push(block, next);
        }
    }

    pub fn get_votes(&self, account: &Address) -> u128 {
        self.delegate_checkpoints
            .get(account)
            .map(Checkpoints::latest)
            .unwrap_or(0)
    }

    pub fn get_past_votes(&self, account: &Address, block: BlockNumber) -> u128 {
        self.delegate_checkpoints
            .get(account)
            .map(|cp| cp.upper_lookup(block))
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply.latest()
    }

    pub fn get_past_total_supply(&self, block: BlockNumber) -> u128 {
        self.total_supply.upper_lookup(block)
    }

    pub fn num_checkpoints(&self, account: &Address) -> usize {
        self.delegate_checkpoints
            .get(account)
            .map(Checkpoints::len)
            .unwrap_or(0)
    }
}
