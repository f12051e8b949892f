//! Events emitted by the governor

use dao_core::{Address, BlockNumber};
use serde::{Deserialize, Serialize};

use crate::proposal::ProposalId;
use crate::voting::VoteType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernorEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: Address,
        voting_token: Address,
        vote_start: BlockNumber,
        vote_end: BlockNumber,
        description: String,
    },
    VoteCast {
        voter: Address,
        id: ProposalId,
        support: VoteType,
        weight: u128,
        reason: Option<String>,
    },
    ProposalQueued {
        id: ProposalId,
        eta: u64,
    },
    ProposalExecuted {
        id: ProposalId,
    },
    ProposalCanceled {
        id: ProposalId,
    },
    TokenAdded {
        token: Address,
    },
    InfoUriChanged {
        uri: String,
    },
    ProposalInfoUriChanged {
        id: ProposalId,
        uri: String,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
}
