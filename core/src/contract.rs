//! Contract call plumbing
//!
//! A proposal's actions are `(target, value, calldata)` triples. A
//! [`CallExecutor`] runs a batch of them on behalf of a caller, all or
//! nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::abi::AbiError;
use crate::address::Address;

/// One action: call `target` with `value` attached and `calldata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub target: Address,
    pub value: u128,
    #[serde(with = "hex::serde")]
    pub calldata: Vec<u8>,
}

/// A call that reverted. The whole batch is rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    #[error("no contract at {0}")]
    NoContract(Address),

    #[error("unknown function selector 0x{0}")]
    UnknownSelector(String),

    #[error("bad calldata: {0}")]
    BadCalldata(#[from] AbiError),

    #[error("call {index} to {target} reverted: {reason}")]
    Reverted {
        index: usize,
        target: Address,
        reason: String,
    },

    #[error("{0}")]
    Message(String),
}

/// A callable contract.
pub trait Contract {
    fn address(&self) -> Address;

    fn call(&mut self, caller: &Address, value: u128, calldata: &[u8]) -> Result<Vec<u8>, Revert>;
}

/// Runs a batch of calls atomically.
pub trait CallExecutor {
    fn execute_batch(&mut self, caller: &Address, calls: &[Call]) -> Result<(), Revert>;
}

/// In-memory set of contracts keyed by address.
///
/// Batches run against a copy of the registry which replaces the original
/// only when every call succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize",
    deserialize = "C: serde::de::DeserializeOwned"
))]
pub struct ContractRegistry<C> {
    contracts: BTreeMap<Address, C>,
}

impl<C: Contract + Clone> ContractRegistry<C> {
    pub fn new() -> Self {
        Self {
            contracts: BTreeMap::new(),
        }
    }

    pub fn deploy(&mut self, contract: C) -> Address {
        let address = contract.address();
        self.contracts.insert(address, contract);
        address
    }

    pub fn get(&self, address: &Address) -> Option<&C> {
        self.contracts.get(address)
    }

    pub fn get_mut(&mut self, address: &Address) -> Option<&mut C> {
        self.contracts.get_mut(address)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl<C: Contract + Clone> Default for ContractRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Contract + Clone> CallExecutor for ContractRegistry<C> {
    fn execute_batch(&mut self, caller: &Address, calls: &[Call]) -> Result<(), Revert> {
        let mut staged = self.contracts.clone();
        for (index, call) in calls.iter().enumerate() {
            let contract = staged
                .get_mut(&call.target)
                .ok_or(Revert::NoContract(call.target))?;
            contract
                .call(caller, call.value, &call.calldata)
                .map_err(|e| Revert::Reverted {
                    index,
                    target: call.target,
                    reason: e.to_string(),
                })?;
        }
        self.contracts = staged;
        log::debug!("executed batch of {} call(s) from {}", calls.len(), caller.short());
        Ok(())
    }
}
