//! Vote counting
//!
//! Simple counting: against, for and abstain weight per proposal, one
//! receipt per voter. Abstain weight counts toward quorum only.

use dao_core::{Address, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{GovernanceError, Result};
use crate::proposal::ProposalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum VoteType {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl TryFrom<u8> for VoteType {
    type Error = GovernanceError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(VoteType::Against),
            1 => Ok(VoteType::For),
            2 => Ok(VoteType::Abstain),
            other => Err(GovernanceError::InvalidVoteType(other)),
        }
    }
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "against" | "0" => Ok(VoteType::Against),
            "for" | "1" => Ok(VoteType::For),
            "abstain" | "2" => Ok(VoteType::Abstain),
            other => Err(format!("unknown vote type '{}' (against|for|abstain)", other)),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Against => write!(f, "against"),
            VoteType::For => write!(f, "for"),
            VoteType::Abstain => write!(f, "abstain"),
        }
    }
}

/// A vote as submitted by a voter.
#[derive(Debug, Clone)]
pub struct Ballot {
    pub proposal_id: ProposalId,
    pub support: VoteType,
    pub reason: Option<String>,
    /// Source the voter claims to vote with; must match the pinned one.
    pub token: Option<Address>,
}

impl Ballot {
    pub fn new(proposal_id: ProposalId, support: VoteType) -> Self {
        Self {
            proposal_id,
            support,
            reason: None,
            token: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_token(mut self, token: Address) -> Self {
        self.token = Some(token);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub support: VoteType,
    pub weight: u128,
    pub reason: Option<String>,
    pub block: BlockNumber,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalTally {
    pub against_votes: u128,
    pub for_votes: u128,
    pub abstain_votes: u128,
    receipts: BTreeMap<Address, VoteReceipt>,
}

impl ProposalTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, account: &Address) -> bool {
        self.receipts.contains_key(account)
    }

    pub fn receipt(&self, account: &Address) -> Option<&VoteReceipt> {
        self.receipts.get(account)
    }

    pub fn voter_count(&self) -> usize {
        self.receipts.len()
    }

    pub fn count_vote(
        &mut self,
        proposal_id: &ProposalId,
        voter: Address,
        receipt: VoteReceipt,
    ) -> Result<()> {
        if self.has_voted(&voter) {
            return Err(GovernanceError::AlreadyVoted {
                voter,
                proposal_id: *proposal_id,
            });
        }
        let slot = match receipt.support {
            VoteType::Against => &mut self.against_votes,
            VoteType::For => &mut self.for_votes,
            VoteType::Abstain => &mut self.abstain_votes,
        };
        *slot = slot.saturating_add(receipt.weight);
        self.receipts.insert(voter, receipt);
        Ok(())
    }

    /// Weight counted toward quorum
    pub fn total(&self) -> u128 {
        self.for_votes
            .saturating_add(self.against_votes)
            .saturating_add(self.abstain_votes)
    }

    pub fn quorum_reached(&self, quorum: u128) -> bool {
        self.total() >= quorum
    }

    /// Strictly more for than against; a tie is a defeat.
    pub fn vote_succeeded(&self) -> bool {
        self.for_votes > self.against_votes
    }

    /// Participation as a percentage of `total_possible`
    pub fn participation_rate(&self, total_possible: u128) -> u128 {
        if total_possible == 0 {
            return 0;
        }
        self.total().saturating_mul(100) / total_possible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_core::H256;

    fn receipt(support: VoteType, weight: u128) -> VoteReceipt {
        VoteReceipt {
            support,
            weight,
            reason: None,
            block: 1,
        }
    }

    #[test]
    fn test_vote_type_codes() {
        assert_eq!(VoteType::try_from(0).unwrap(), VoteType::Against);
        assert_eq!(VoteType::try_from(1).unwrap(), VoteType::For);
        assert_eq!(VoteType::try_from(2).unwrap(), VoteType::Abstain);
        assert_eq!(VoteType::try_from(3), Err(GovernanceError::InvalidVoteType(3)));
        assert_eq!("For".parse::<VoteType>().unwrap(), VoteType::For);
    }

    #[test]
    fn test_tally() {
        let id = H256::zero();
        let mut tally = ProposalTally::new();
        tally.count_vote(&id, Address::from_label("mn1"), receipt(VoteType::For, 100)).unwrap();
        tally.count_vote(&id, Address::from_label("mn2"), receipt(VoteType::Against, 50)).unwrap();
        tally.count_vote(&id, Address::from_label("mn3"), receipt(VoteType::Abstain, 25)).unwrap();

        assert_eq!(tally.total(), 175);
        assert_eq!(tally.for_votes, 100);
        assert_eq!(tally.against_votes, 50);
        assert!(tally.vote_succeeded());
        assert!(tally.quorum_reached(175));
        assert!(!tally.quorum_reached(176));
        assert_eq!(tally.participation_rate(350), 50);
    }

    #[test]
    fn test_single_vote_per_account() {
        let id = H256::zero();
        let voter = Address::from_label("mn1");
        let mut tally = ProposalTally::new();
        tally.count_vote(&id, voter, receipt(VoteType::For, 10)).unwrap();
        let err = tally.count_vote(&id, voter, receipt(VoteType::Against, 10)).unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyVoted { .. }));
        assert_eq!(tally.for_votes, 10);
        assert_eq!(tally.against_votes, 0);
        assert_eq!(tally.voter_count(), 1);
    }

    #[test]
    fn test_tie_is_not_success() {
        let id = H256::zero();
        let mut tally = ProposalTally::new();
        tally.count_vote(&id, Address::from_label("a"), receipt(VoteType::For, 10)).unwrap();
        tally.count_vote(&id, Address::from_label("b"), receipt(VoteType::Against, 10)).unwrap();
        assert!(!tally.vote_succeeded());
    }
}
