//! Timelock controller
//!
//! Successful proposals can be routed through a timelock: the governor
//! schedules the proposal's calls, and they only become executable after
//! `min_delay` seconds and stop being executable `grace_period` seconds
//! later. Access is role based; a role granted to [`Address::ZERO`] is open
//! to everyone.

use dao_core::{keccak256_concat, Address, Call, CallExecutor, Revert, H256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

pub type OperationId = H256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Proposer,
    Executor,
    Canceller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "TIMELOCK_ADMIN_ROLE"),
            Role::Proposer => write!(f, "PROPOSER_ROLE"),
            Role::Executor => write!(f, "EXECUTOR_ROLE"),
            Role::Canceller => write!(f, "CANCELLER_ROLE"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelockError {
    #[error("AccessControl: account {account} is missing role {role}")]
    MissingRole { account: Address, role: Role },

    #[error("TimelockController: insufficient delay ({delay} < {min_delay})")]
    InsufficientDelay { delay: u64, min_delay: u64 },

    #[error("TimelockController: operation {0} already scheduled")]
    OperationExists(OperationId),

    #[error("TimelockController: operation {0} is not scheduled")]
    UnknownOperation(OperationId),

    #[error("TimelockController: operation {id} is not ready (ready at {ready_at}, now {now})")]
    OperationNotReady { id: OperationId, ready_at: u64, now: u64 },

    #[error("TimelockController: operation {0} expired")]
    OperationExpired(OperationId),

    #[error("TimelockController: operation {0} cannot be cancelled")]
    OperationNotPending(OperationId),

    #[error("TimelockController: missing dependency {0}")]
    PredecessorNotDone(OperationId),

    #[error("TimelockController: underlying transaction reverted: {0}")]
    Reverted(#[from] Revert),
}

pub type Result<T> = std::result::Result<T, TimelockError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Pending,
    Done,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub ready_at: u64,
    pub status: OperationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timelock {
    address: Address,
    min_delay: u64,
    grace_period: u64,
    roles: BTreeSet<(Role, Address)>,
    operations: BTreeMap<OperationId, Operation>,
}

impl Timelock {
    pub fn new(address: Address, min_delay: u64, grace_period: u64, admin: Address) -> Self {
        Self {
            address,
            min_delay,
            grace_period,
            roles: BTreeSet::from([(Role::Admin, admin)]),
            operations: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn min_delay(&self) -> u64 {
        self.min_delay
    }

    pub fn grace_period(&self) -> u64 {
        self.grace_period
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.contains(&(role, *account)) || self.roles.contains(&(role, Address::ZERO))
    }

    fn check_role(&self, role: Role, account: &Address) -> Result<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(TimelockError::MissingRole {
                account: *account,
                role,
            })
        }
    }

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: Address) -> Result<()> {
        self.check_role(Role::Admin, caller)?;
        self.roles.insert((role, account));
        log::info!("timelock {}: granted {} to {}", self.address.short(), role, account.short());
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<()> {
        self.check_role(Role::Admin, caller)?;
        self.roles.remove(&(role, *account));
        log::info!("timelock {}: revoked {} from {}", self.address.short(), role, account.short());
        Ok(())
    }

    /// Id of a batch of calls, distinguished by `predecessor` and `salt`.
    pub fn hash_operation_batch(calls: &[Call], predecessor: &H256, salt: &H256) -> OperationId {
        let mut encoded = Vec::new();
        encoded.extend_from_slice(&(calls.len() as u64).to_be_bytes());
        for call in calls {
            encoded.extend_from_slice(call.target.as_bytes());
            encoded.extend_from_slice(&call.value.to_be_bytes());
            encoded.extend_from_slice(&(call.calldata.len() as u64).to_be_bytes());
            encoded.extend_from_slice(&call.calldata);
        }
        keccak256_concat([
            encoded.as_slice(),
            predecessor.as_bytes().as_slice(),
            salt.as_bytes().as_slice(),
        ])
    }

    pub fn operation(&self, id: &OperationId) -> Option<&Operation> {
        self.operations.get(id)
    }

    pub fn is_operation_pending(&self, id: &OperationId) -> bool {
        matches!(self.operations.get(id), Some(op) if op.status == OperationStatus::Pending)
    }

    pub fn is_operation_ready(&self, id: &OperationId, now: u64) -> bool {
        matches!(
            self.operations.get(id),
            Some(op) if op.status == OperationStatus::Pending
                && now >= op.ready_at
                && now < op.ready_at.saturating_add(self.grace_period)
        )
    }

    pub fn is_operation_done(&self, id: &OperationId) -> bool {
        matches!(self.operations.get(id), Some(op) if op.status == OperationStatus::Done)
    }

    /// Schedule a batch; returns its id and the timestamp it becomes ready.
    pub fn schedule(
        &mut self,
        caller: &Address,
        calls: &[Call],
        predecessor: &H256,
        salt: &H256,
        delay: u64,
        now: u64,
    ) -> Result<(OperationId, u64)> {
        self.check_role(Role::Proposer, caller)?;
        if delay < self.min_delay {
            return Err(TimelockError::InsufficientDelay {
                delay,
                min_delay: self.min_delay,
            });
        }
        let id = Self::hash_operation_batch(calls, predecessor, salt);
        if self.operations.contains_key(&id) {
            return Err(TimelockError::OperationExists(id));
        }
        let ready_at = now.saturating_add(delay);
        self.operations.insert(
            id,
            Operation {
                ready_at,
                status: OperationStatus::Pending,
            },
        );
        log::info!("timelock {}: scheduled {} ready at {}", self.address.short(), id.short(), ready_at);
        Ok((id, ready_at))
    }

    /// Run a ready batch. The calls are made with the timelock as caller.
    pub fn execute<E: CallExecutor + ?Sized>(
        &mut self,
        caller: &Address,
        calls: &[Call],
        predecessor: &H256,
        salt: &H256,
        now: u64,
        executor: &mut E,
    ) -> Result<OperationId> {
        self.check_role(Role::Executor, caller)?;
        let id = Self::hash_operation_batch(calls, predecessor, salt);
        let op = self
            .operations
            .get(&id)
            .ok_or(TimelockError::UnknownOperation(id))?;
        if op.status != OperationStatus::Pending {
            return Err(TimelockError::OperationNotPending(id));
        }
        if now < op.ready_at {
            return Err(TimelockError::OperationNotReady {
                id,
                ready_at: op.ready_at,
                now,
            });
        }
        if now >= op.ready_at.saturating_add(self.grace_period) {
            return Err(TimelockError::OperationExpired(id));
        }
        if *predecessor != H256::zero() && !self.is_operation_done(predecessor) {
            return Err(TimelockError::PredecessorNotDone(*predecessor));
        }

        executor.execute_batch(&self.address, calls)?;

        if let Some(op) = self.operations.get_mut(&id) {
            op.status = OperationStatus::Done;
        }
        log::info!("timelock {}: executed {}", self.address.short(), id.short());
        Ok(id)
    }

    pub fn cancel(&mut self, caller: &Address, id: &OperationId) -> Result<()> {
        self.check_role(Role::Canceller, caller)?;
        match self.operations.get_mut(id) {
            Some(op) if op.status == OperationStatus::Pending => {
                op.status = OperationStatus::Canceled;
                log::info!("timelock {}: canceled {}", self.address.short(), id.short());
                Ok(())
            }
            _ => Err(TimelockError::OperationNotPending(*id)),
        }
    }
}
