//! Proposal lifecycle
//!
//! State is never stored. It is derived on every query from the proposal's
//! flags, its tally, the current block and the timelock queue.

use dao_core::Block;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::proposal::ProposalCore;
use crate::settings::QUORUM_DENOMINATOR;
use crate::voting::ProposalTally;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProposalState {
    Pending = 0,
    Active = 1,
    Canceled = 2,
    Defeated = 3,
    Succeeded = 4,
    Queued = 5,
    Expired = 6,
    Executed = 7,
}

impl ProposalState {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_final(self) -> bool {
        matches!(
            self,
            ProposalState::Canceled
                | ProposalState::Defeated
                | ProposalState::Expired
                | ProposalState::Executed
        )
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalState::Pending => "Pending",
            ProposalState::Active => "Active",
            ProposalState::Canceled => "Canceled",
            ProposalState::Defeated => "Defeated",
            ProposalState::Succeeded => "Succeeded",
            ProposalState::Queued => "Queued",
            ProposalState::Expired => "Expired",
            ProposalState::Executed => "Executed",
        };
        write!(f, "{}", name)
    }
}

/// Where a successful proposal stands in the timelock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Unqueued,
    Waiting { eta: u64, grace_period: u64 },
    Canceled,
    Done,
}

/// `floor(total_supply * numerator / 100)`
pub fn quorum_for(past_total_supply: u128, numerator: u128) -> u128 {
    past_total_supply.saturating_mul(numerator) / QUORUM_DENOMINATOR
}

pub fn compute_state(
    core: &ProposalCore,
    tally: &ProposalTally,
    block: &Block,
    quorum: u128,
    queue: QueueStatus,
) -> ProposalState {
    if core.executed {
        return ProposalState::Executed;
    }
    if core.canceled {
        return ProposalState::Canceled;
    }
    if block.number < core.vote_start {
        return ProposalState::Pending;
    }
    if block.number <= core.vote_end {
        return ProposalState::Active;
    }
    if !(tally.quorum_reached(quorum) && tally.vote_succeeded()) {
        return ProposalState::Defeated;
    }
    match queue {
        QueueStatus::Unqueued => ProposalState::Succeeded,
        QueueStatus::Waiting { eta, grace_period } => {
            if block.timestamp >= eta.saturating_add(grace_period) {
                ProposalState::Expired
            } else {
                ProposalState::Queued
            }
        }
        QueueStatus::Canceled => ProposalState::Canceled,
        QueueStatus::Done => ProposalState::Executed,
    }
}
