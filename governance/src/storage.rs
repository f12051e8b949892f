//! Proposal persistence

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::proposal::{ProposalCore, ProposalId};
use crate::voting::ProposalTally;

/// A proposal together with its vote tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub core: ProposalCore,
    pub tally: ProposalTally,
}

impl ProposalRecord {
    pub fn new(core: ProposalCore) -> Self {
        Self {
            core,
            tally: ProposalTally::new(),
        }
    }
}

/// Abstraction for proposal persistence.
/// Records are only ever added; proposals are never deleted.
pub trait ProposalStore {
    fn insert(&mut self, record: ProposalRecord);
    fn get(&self, id: &ProposalId) -> Option<&ProposalRecord>;
    fn get_mut(&mut self, id: &ProposalId) -> Option<&mut ProposalRecord>;
    /// Ids in creation order
    fn ids(&self) -> Vec<ProposalId>;
    fn len(&self) -> usize;

    fn contains(&self, id: &ProposalId) -> bool {
        self.get(id).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Simple in-memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryProposalStore {
    order: Vec<ProposalId>,
    records: BTreeMap<ProposalId, ProposalRecord>,
}

impl InMemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProposalStore for InMemoryProposalStore {
    fn insert(&mut self, record: ProposalRecord) {
        let id = record.core.id;
        if self.records.insert(id, record).is_none() {
            self.order.push(id);
        }
    }

    fn get(&self, id: &ProposalId) -> Option<&ProposalRecord> {
        self.records.get(id)
    }

    fn get_mut(&mut self, id: &ProposalId) -> Option<&mut ProposalRecord> {
        self.records.get_mut(id)
    }

    fn ids(&self) -> Vec<ProposalId> {
        self.order.clone()
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{hash_description, ProposalActions};
    use dao_core::Address;

    fn record(description: &str) -> ProposalRecord {
        let actions = ProposalActions::single(Address::from_label("treasury"), 0, vec![1, 2, 3, 4]);
        let description_hash = hash_description(description);
        ProposalRecord::new(ProposalCore {
            id: actions.proposal_id(&description_hash),
            proposer: Address::from_label("owner"),
            actions,
            description: description.to_string(),
            description_hash,
            created_at: 1,
            vote_start: 2,
            vote_end: 7,
            voting_token: Address::from_label("token"),
            canceled: false,
            executed: false,
            info_uri: None,
            eta: None,
        })
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut store = InMemoryProposalStore::new();
        let first = record("b");
        let second = record("a");
        let (first_id, second_id) = (first.core.id, second.core.id);
        store.insert(first);
        store.insert(second);

        assert_eq!(store.ids(), vec![first_id, second_id]);
        assert_eq!(store.len(), 2);
        assert!(store.contains(&first_id));
    }

    #[test]
    fn test_update_in_place() {
        let mut store = InMemoryProposalStore::new();
        let r = record("a");
        let id = r.core.id;
        store.insert(r);
        store.get_mut(&id).unwrap().core.canceled = true;
        assert!(store.get(&id).unwrap().core.canceled);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut store = InMemoryProposalStore::new();
        let r = record("a");
        let id = r.core.id;
        store.insert(r);
        let json = serde_json::to_string(&store).unwrap();
        let restored: InMemoryProposalStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.ids(), vec![id]);
    }
}
