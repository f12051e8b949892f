//! Proposal types and identifiers

use dao_core::{keccak256, keccak256_concat, Address, BlockNumber, Call, H256};
use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, Result};

/// Deterministic proposal identifier, see [`ProposalActions::proposal_id`].
pub type ProposalId = H256;

pub fn hash_description(description: &str) -> H256 {
    keccak256(description.as_bytes())
}

/// The calls a proposal executes, as three parallel sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalActions {
    pub targets: Vec<Address>,
    pub values: Vec<u128>,
    pub calldatas: Vec<Vec<u8>>,
}

impl ProposalActions {
    pub fn new(targets: Vec<Address>, values: Vec<u128>, calldatas: Vec<Vec<u8>>) -> Self {
        Self {
            targets,
            values,
            calldatas,
        }
    }

    pub fn single(target: Address, value: u128, calldata: Vec<u8>) -> Self {
        Self::new(vec![target], vec![value], vec![calldata])
    }

    pub fn push(mut self, target: Address, value: u128, calldata: Vec<u8>) -> Self {
        self.targets.push(target);
        self.values.push(value);
        self.calldatas.push(calldata);
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.len() != self.values.len() || self.targets.len() != self.calldatas.len() {
            return Err(GovernanceError::InvalidProposalLength {
                targets: self.targets.len(),
                values: self.values.len(),
                calldatas: self.calldatas.len(),
            });
        }
        if self.targets.is_empty() {
            return Err(GovernanceError::EmptyProposal);
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.targets
            .iter()
            .zip(&self.values)
            .zip(&self.calldatas)
            .map(|((target, value), calldata)| Call {
                target: *target,
                value: *value,
                calldata: calldata.clone(),
            })
            .collect()
    }

    /// `keccak256(targets, values, calldatas, description_hash)`. Every
    /// sequence is length prefixed so different call sets never encode to
    /// the same bytes.
    pub fn proposal_id(&self, description_hash: &H256) -> ProposalId {
        let mut encoded = Vec::new();
        encoded.extend_from_slice(&(self.targets.len() as u64).to_be_bytes());
        for target in &self.targets {
            encoded.extend_from_slice(&[0u8; 12]);
            encoded.extend_from_slice(target.as_bytes());
        }
        encoded.extend_from_slice(&(self.values.len() as u64).to_be_bytes());
        for value in &self.values {
            encoded.extend_from_slice(&[0u8; 16]);
            encoded.extend_from_slice(&value.to_be_bytes());
        }
        encoded.extend_from_slice(&(self.calldatas.len() as u64).to_be_bytes());
        for calldata in &self.calldatas {
            encoded.extend_from_slice(&(calldata.len() as u64).to_be_bytes());
            encoded.extend_from_slice(calldata);
        }
        keccak256_concat([encoded.as_slice(), description_hash.as_bytes().as_slice()])
    }
}

/// Arguments of a `propose` call.
#[derive(Debug, Clone, Default)]
pub struct ProposalRequest {
    pub actions: ProposalActions,
    pub description: String,
    /// Voting power source to weigh the proposal against. `None` pins the
    /// governor's primary token.
    pub voting_token: Option<Address>,
    pub info_uri: Option<String>,
}

impl ProposalRequest {
    pub fn new(actions: ProposalActions, description: impl Into<String>) -> Self {
        Self {
            actions,
            description: description.into(),
            voting_token: None,
            info_uri: None,
        }
    }

    pub fn with_token(mut self, token: Address) -> Self {
        self.voting_token = Some(token);
        self
    }

    pub fn with_info_uri(mut self, uri: impl Into<String>) -> Self {
        self.info_uri = Some(uri.into());
        self
    }
}

/// Immutable proposal parameters plus the one-shot flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalCore {
    pub id: ProposalId,
    pub proposer: Address,
    pub actions: ProposalActions,
    pub description: String,
    pub description_hash: H256,
    pub created_at: BlockNumber,
    pub vote_start: BlockNumber,
    pub vote_end: BlockNumber,
    pub voting_token: Address,
    pub canceled: bool,
    pub executed: bool,
    pub info_uri: Option<String>,
    /// Timestamp the queued timelock operation becomes executable
    pub eta: Option<u64>,
}

impl ProposalCore {
    pub fn is_finalized(&self) -> bool {
        self.executed || self.canceled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_core::encode_call;

    fn treasury() -> Address {
        Address::from_label("treasury")
    }

    #[test]
    fn test_id_is_deterministic() {
        let actions = ProposalActions::single(treasury(), 0, encode_call("execute()", &[]));
        let hash = hash_description("Proposal #1: execute");
        assert_eq!(actions.proposal_id(&hash), actions.clone().proposal_id(&hash));
    }

    #[test]
    fn test_id_depends_on_every_field() {
        let base = ProposalActions::single(treasury(), 0, encode_call("execute()", &[]));
        let hash = hash_description("Proposal #1: execute");
        let id = base.proposal_id(&hash);

        let other_value = ProposalActions::single(treasury(), 1, encode_call("execute()", &[]));
        let other_target = ProposalActions::single(Address::from_label("x"), 0, encode_call("execute()", &[]));
        let other_data = ProposalActions::single(treasury(), 0, encode_call("other()", &[]));

        assert_ne!(id, other_value.proposal_id(&hash));
        assert_ne!(id, other_target.proposal_id(&hash));
        assert_ne!(id, other_data.proposal_id(&hash));
        assert_ne!(id, base.proposal_id(&hash_description("Proposal #2")));
    }

    #[test]
    fn test_validate_lengths() {
        let bad = ProposalActions::new(vec![treasury()], vec![], vec![vec![]]);
        assert!(matches!(
            bad.validate(),
            Err(GovernanceError::InvalidProposalLength { targets: 1, values: 0, calldatas: 1 })
        ));
        assert_eq!(ProposalActions::default().validate(), Err(GovernanceError::EmptyProposal));
    }

    #[test]
    fn test_calls_preserve_order() {
        let actions = ProposalActions::single(treasury(), 0, encode_call("execute()", &[]))
            .push(Address::from_label("other"), 5, vec![1, 2, 3, 4]);
        let calls = actions.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].value, 5);
        assert_eq!(calls[1].target, Address::from_label("other"));
    }
}
