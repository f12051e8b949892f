//! Governance error types

use dao_core::{Address, Revert};
use thiserror::Error;

use crate::proposal::ProposalId;
use crate::state::ProposalState;
use crate::timelock::TimelockError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Invalid governor settings: {0}")]
    InvalidSettings(String),

    #[error("Governor: empty proposal")]
    EmptyProposal,

    #[error("Governor: invalid proposal length ({targets} targets, {values} values, {calldatas} calldatas)")]
    InvalidProposalLength {
        targets: usize,
        values: usize,
        calldatas: usize,
    },

    #[error("Governor: proposal {0} already exists")]
    ProposalAlreadyExists(ProposalId),

    #[error("Governor: unknown proposal id {0}")]
    UnknownProposal(ProposalId),

    #[error("Governor: proposer votes below proposal threshold ({votes} < {threshold})")]
    BelowThreshold { votes: u128, threshold: u128 },

    #[error("GovernorVotingSimple: vote already cast by {voter} on {proposal_id}")]
    AlreadyVoted {
        voter: Address,
        proposal_id: ProposalId,
    },

    #[error("Governor: vote not currently active (state {state})")]
    VotingClosed { state: ProposalState },

    #[error("GovernorVotingSimple: invalid value for enum VoteType: {0}")]
    InvalidVoteType(u8),

    #[error("Proposal token should be with voting power (pinned {expected}, got {got})")]
    TokenMismatch { expected: Address, got: Address },

    #[error("Token {0} is not registered with the governor")]
    UnregisteredToken(Address),

    #[error("No voting power source deployed at {0}")]
    UnknownToken(Address),

    #[error("Token {0} already registered")]
    TokenAlreadyRegistered(Address),

    #[error("Token index {index} out of bounds ({len} registered)")]
    TokenIndexOutOfBounds { index: usize, len: usize },

    #[error("Governor: proposal not successful (state {state})")]
    ProposalNotSuccessful { state: ProposalState },

    #[error("Governor: proposal {0} already executed")]
    AlreadyExecuted(ProposalId),

    #[error("Governor: proposal not active (state {state})")]
    ProposalNotActive { state: ProposalState },

    #[error("Not proposer or owner")]
    NotProposerOrOwner,

    #[error("Caller is not the proposer")]
    NotProposer,

    #[error("Ownable: caller is not the owner")]
    NotOwner,

    #[error("Proposal {0} is executed or canceled")]
    ProposalFinalized(ProposalId),

    #[error("Governor has no timelock")]
    NoTimelock,

    #[error("Governor: call reverted: {0}")]
    ExecutionReverted(#[from] Revert),

    #[error(transparent)]
    Timelock(#[from] TimelockError),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
