//! Treasury contract
//!
//! The usual target of governance proposals. Owned by the governor (or its
//! timelock), it counts how many proposals have executed against it and
//! holds funds that only a proposal can release.

use dao_core::{Address, Calldata, Contract, Revert};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreasuryError};

pub const EXECUTE_SIGNATURE: &str = "execute()";
pub const RELEASE_SIGNATURE: &str = "release(address,uint256)";

/// A payout made by the treasury
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub recipient: Address,
    pub amount: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasury {
    address: Address,
    owner: Address,
    executed_proposals: u64,
    balance: u128,
    releases: Vec<Release>,
}

impl Treasury {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            executed_proposals: 0,
            balance: 0,
            releases: Vec::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn executed_proposals(&self) -> u64 {
        self.executed_proposals
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    fn only_owner(&self, caller: &Address) -> Result<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(TreasuryError::NotOwner)
        }
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TreasuryError::OwnerIsZero);
        }
        log::info!("treasury {} ownership {} -> {}", self.address.short(), self.owner.short(), new_owner.short());
        self.owner = new_owner;
        Ok(())
    }

    pub fn deposit(&mut self, amount: u128) {
        self.balance = self.balance.saturating_add(amount);
        log::debug!("treasury {} received {} (balance {})", self.address.short(), amount, self.balance);
    }

    pub fn execute(&mut self, caller: &Address) -> Result<u64> {
        self.only_owner(caller)?;
        self.executed_proposals += 1;
        log::info!("💰 treasury executed proposal #{}", self.executed_proposals);
        Ok(self.executed_proposals)
    }

    pub fn release(&mut self, caller: &Address, recipient: Address, amount: u128) -> Result<()> {
        self.only_owner(caller)?;
        if recipient.is_zero() {
            return Err(TreasuryError::ReleaseToZero);
        }
        if amount > self.balance {
            return Err(TreasuryError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.releases.push(Release { recipient, amount });
        log::info!("💰 treasury released {} to {}", amount, recipient.short());
        Ok(())
    }
}

impl Contract for Treasury {
    fn address(&self) -> Address {
        self.address
    }

    fn call(&mut self, caller: &Address, value: u128, calldata: &[u8]) -> std::result::Result<Vec<u8>, Revert> {
        if value > 0 {
            self.deposit(value);
        }
        if calldata.is_empty() {
            return Ok(Vec::new());
        }

        let data = Calldata::parse(calldata)?;
        if data.is(EXECUTE_SIGNATURE) {
            let count = self.execute(caller)?;
            Ok(u128::from(count).to_be_bytes().to_vec())
        } else if data.is(RELEASE_SIGNATURE) {
            self.release(caller, data.address(0)?, data.uint(1)?)?;
            Ok(Vec::new())
        } else {
            Err(Revert::UnknownSelector(hex::encode(data.selector)))
        }
    }
}
