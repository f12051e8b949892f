//! DAO Governance Module
//!
//! On-chain style governor: proposals are created against a snapshot of
//! delegated voting power, voted on during a block window, tallied against
//! a quorum and then executed (optionally through a timelock) or canceled.

pub mod error;
pub mod events;
pub mod governor;
pub mod proposal;
pub mod settings;
pub mod state;
pub mod storage;
pub mod timelock;
pub mod voting;

pub use error::{GovernanceError, Result};
pub use events::GovernorEvent;
pub use governor::{Governor, GovernorParams};
pub use proposal::{hash_description, ProposalActions, ProposalCore, ProposalId, ProposalRequest};
pub use settings::{GovernorSettings, QUORUM_DENOMINATOR};
pub use state::{compute_state, quorum_for, ProposalState, QueueStatus};
pub use storage::{InMemoryProposalStore, ProposalRecord, ProposalStore};
pub use timelock::{Operation, OperationId, OperationStatus, Role, Timelock, TimelockError};
pub use voting::{Ballot, ProposalTally, VoteReceipt, VoteType};

/// Governance configuration constants
pub mod config {
    /// Blocks between proposal creation and the voting snapshot
    pub const VOTING_DELAY_BLOCKS: u64 = 1;

    /// Blocks a vote stays open
    pub const VOTING_PERIOD_BLOCKS: u64 = 5;

    /// Whole tokens a proposer must hold delegated (1000 GT)
    pub const PROPOSAL_THRESHOLD_TOKENS: u64 = 1_000;

    /// Required quorum percentage (4%)
    pub const QUORUM_PERCENTAGE: u128 = 4;

    /// Timelock minimum delay (1 hour)
    pub const MIN_DELAY_SECS: u64 = 3_600;

    /// Window in which a ready timelock operation can run (14 days)
    pub const GRACE_PERIOD_SECS: u64 = 14 * 24 * 3_600;

    pub const GOVERNOR_NAME: &str = "Governor Contract";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governance_constants() {
        assert_eq!(config::QUORUM_PERCENTAGE, 4);
        assert_eq!(config::VOTING_PERIOD_BLOCKS, 5);
        assert_eq!(config::GRACE_PERIOD_SECS, 1_209_600);
    }
}
