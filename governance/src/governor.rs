//! The governor
//!
//! Owns the proposal registry and drives every proposal through its
//! lifecycle: propose, vote, tally, queue and execute or cancel. Voting
//! power is read from the sources passed into each call; the governor only
//! keeps the addresses of the tokens it accepts.

use dao_core::{Address, Block, BlockNumber, CallExecutor, H256};
use dao_votes::{SourceRegistry, VotingPowerSource};
use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, Result};
use crate::events::GovernorEvent;
use crate::proposal::{hash_description, ProposalActions, ProposalCore, ProposalId, ProposalRequest};
use crate::settings::{GovernorSettings, QUORUM_DENOMINATOR};
use crate::state::{compute_state, quorum_for, ProposalState, QueueStatus};
use crate::storage::{InMemoryProposalStore, ProposalRecord, ProposalStore};
use crate::timelock::{OperationStatus, Timelock};
use crate::voting::{Ballot, VoteReceipt, VoteType};

/// Construction parameters of a [`Governor`].
#[derive(Debug, Clone)]
pub struct GovernorParams {
    pub address: Address,
    pub name: String,
    pub info_uri: String,
    pub owner: Address,
    /// Primary voting token, registered at index 0
    pub token: Address,
    pub settings: GovernorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: serde::de::DeserializeOwned"
))]
pub struct Governor<S = InMemoryProposalStore> {
    address: Address,
    name: String,
    info_uri: String,
    owner: Address,
    settings: GovernorSettings,
    tokens: Vec<Address>,
    store: S,
    timelock: Option<Timelock>,
    #[serde(skip)]
    events: Vec<GovernorEvent>,
}

fn resolve<'a>(sources: &'a dyn SourceRegistry, token: &Address) -> Result<&'a dyn VotingPowerSource> {
    sources
        .source(token)
        .ok_or(GovernanceError::UnknownToken(*token))
}

/// Snapshot block of a proposal: the last block finished before voting
/// opens at `vote_start`. `None` when voting opens at genesis.
fn snapshot_block(core: &ProposalCore) -> Option<BlockNumber> {
    core.vote_start.checked_sub(1)
}

fn rejected(operation: &str, err: GovernanceError) -> GovernanceError {
    log::warn!("⚠️  {} rejected: {}", operation, err);
    err
}

impl Governor<InMemoryProposalStore> {
    pub fn new(params: GovernorParams, sources: &dyn SourceRegistry) -> Result<Self> {
        Self::with_store(params, sources, InMemoryProposalStore::new())
    }
}

impl<S: ProposalStore> Governor<S> {
    pub fn with_store(params: GovernorParams, sources: &dyn SourceRegistry, store: S) -> Result<Self> {
        params.settings.validate()?;
        resolve(sources, &params.token)?;
        log::info!(
            "governor '{}' deployed at {} (token {}, delay {}, period {}, quorum {}%)",
            params.name,
            params.address,
            params.token,
            params.settings.voting_delay,
            params.settings.voting_period,
            params.settings.quorum_numerator
        );
        Ok(Self {
            address: params.address,
            name: params.name,
            info_uri: params.info_uri,
            owner: params.owner,
            settings: params.settings,
            tokens: vec![params.token],
            store,
            timelock: None,
            events: Vec::new(),
        })
    }

    /// Route successful proposals through `timelock`. The governor must hold
    /// its proposer, executor and canceller roles.
    pub fn with_timelock(mut self, timelock: Timelock) -> Self {
        log::info!("governor {} uses timelock {}", self.address.short(), timelock.address());
        self.timelock = Some(timelock);
        self
    }

    pub fn hash_proposal(actions: &ProposalActions, description_hash: &H256) -> ProposalId {
        actions.proposal_id(description_hash)
    }

    // Metadata

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info_uri(&self) -> &str {
        &self.info_uri
    }

    pub fn set_info_uri(&mut self, caller: &Address, uri: impl Into<String>) -> Result<()> {
        self.only_owner(caller)?;
        self.info_uri = uri.into();
        self.events.push(GovernorEvent::InfoUriChanged {
            uri: self.info_uri.clone(),
        });
        Ok(())
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        self.only_owner(caller)?;
        let previous = std::mem::replace(&mut self.owner, new_owner);
        self.events.push(GovernorEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        log::info!("governor ownership {} -> {}", previous.short(), new_owner.short());
        Ok(())
    }

    fn only_owner(&self, caller: &Address) -> Result<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(GovernanceError::NotOwner)
        }
    }

    pub fn settings(&self) -> &GovernorSettings {
        &self.settings
    }

    pub fn voting_delay(&self) -> BlockNumber {
        self.settings.voting_delay
    }

    pub fn voting_period(&self) -> BlockNumber {
        self.settings.voting_period
    }

    pub fn proposal_threshold(&self) -> u128 {
        self.settings.proposal_threshold
    }

    pub fn quorum_numerator(&self) -> u128 {
        self.settings.quorum_numerator
    }

    pub fn quorum_denominator(&self) -> u128 {
        QUORUM_DENOMINATOR
    }

    pub fn timelock(&self) -> Option<&Timelock> {
        self.timelock.as_ref()
    }

    pub fn events(&self) -> &[GovernorEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<GovernorEvent> {
        std::mem::take(&mut self.events)
    }

    // Tokens

    /// The primary voting token
    pub fn token(&self) -> Address {
        self.tokens[0]
    }

    pub fn tokens(&self) -> &[Address] {
        &self.tokens
    }

    pub fn get_token_element(&self, index: usize) -> Result<Address> {
        self.tokens
            .get(index)
            .copied()
            .ok_or(GovernanceError::TokenIndexOutOfBounds {
                index,
                len: self.tokens.len(),
            })
    }

    pub fn is_registered(&self, token: &Address) -> bool {
        self.tokens.contains(token)
    }

    pub fn add_token(&mut self, sources: &dyn SourceRegistry, caller: &Address, token: Address) -> Result<()> {
        self.try_add_token(sources, caller, token)
            .map_err(|e| rejected("add_token", e))
    }

    fn try_add_token(&mut self, sources: &dyn SourceRegistry, caller: &Address, token: Address) -> Result<()> {
        self.only_owner(caller)?;
        if self.is_registered(&token) {
            return Err(GovernanceError::TokenAlreadyRegistered(token));
        }
        let source = resolve(sources, &token)?;
        self.tokens.push(token);
        self.events.push(GovernorEvent::TokenAdded { token });
        log::info!(
            "✓ registered {} voting token {} at index {}",
            source.kind(),
            token,
            self.tokens.len() - 1
        );
        Ok(())
    }

    fn registered_or_primary(&self, token: Option<Address>) -> Result<Address> {
        let token = token.unwrap_or_else(|| self.token());
        if self.is_registered(&token) {
            Ok(token)
        } else {
            Err(GovernanceError::UnregisteredToken(token))
        }
    }

    /// Votes of `account` at the end of `block` in `token` (primary when `None`).
    pub fn get_votes(
        &self,
        sources: &dyn SourceRegistry,
        account: &Address,
        block: BlockNumber,
        token: Option<Address>,
    ) -> Result<u128> {
        let token = self.registered_or_primary(token)?;
        Ok(resolve(sources, &token)?.get_past_votes(account, block))
    }

    /// Quorum at `block` for `token` (primary when `None`).
    pub fn quorum(&self, sources: &dyn SourceRegistry, block: BlockNumber, token: Option<Address>) -> Result<u128> {
        let token = self.registered_or_primary(token)?;
        self.quorum_at(sources, &token, block)
    }

    fn quorum_at(&self, sources: &dyn SourceRegistry, token: &Address, block: BlockNumber) -> Result<u128> {
        let supply = resolve(sources, token)?.get_past_total_supply(block);
        Ok(quorum_for(supply, self.settings.quorum_numerator))
    }

    // Proposal queries

    pub fn proposal(&self, id: &ProposalId) -> Result<&ProposalRecord> {
        self.store
            .get(id)
            .ok_or(GovernanceError::UnknownProposal(*id))
    }

    pub fn proposal_ids(&self) -> Vec<ProposalId> {
        self.store.ids()
    }

    pub fn proposal_count(&self) -> usize {
        self.store.len()
    }

    /// Block at which voting opens. Weights and supply are read as they stood
    /// before it, so nothing done once voting is open changes them.
    pub fn proposal_snapshot(&self, id: &ProposalId) -> Result<BlockNumber> {
        Ok(self.proposal(id)?.core.vote_start)
    }

    /// Quorum the proposal is measured against, fixed at its snapshot.
    pub fn proposal_quorum(&self, sources: &dyn SourceRegistry, id: &ProposalId) -> Result<u128> {
        let core = &self.proposal(id)?.core;
        match snapshot_block(core) {
            Some(snapshot) => self.quorum_at(sources, &core.voting_token, snapshot),
            None => resolve(sources, &core.voting_token).map(|_| 0),
        }
    }

    pub fn proposal_deadline(&self, id: &ProposalId) -> Result<BlockNumber> {
        Ok(self.proposal(id)?.core.vote_end)
    }

    pub fn proposal_proposer(&self, id: &ProposalId) -> Result<Address> {
        Ok(self.proposal(id)?.core.proposer)
    }

    pub fn proposal_token(&self, id: &ProposalId) -> Result<Address> {
        Ok(self.proposal(id)?.core.voting_token)
    }

    pub fn proposal_eta(&self, id: &ProposalId) -> Result<Option<u64>> {
        Ok(self.proposal(id)?.core.eta)
    }

    /// `(against, for, abstain)`
    pub fn proposal_votes(&self, id: &ProposalId) -> Result<(u128, u128, u128)> {
        let tally = &self.proposal(id)?.tally;
        Ok((tally.against_votes, tally.for_votes, tally.abstain_votes))
    }

    pub fn has_voted(&self, id: &ProposalId, account: &Address) -> Result<bool> {
        Ok(self.proposal(id)?.tally.has_voted(account))
    }

    pub fn get_receipt(&self, id: &ProposalId, account: &Address) -> Result<Option<&VoteReceipt>> {
        Ok(self.proposal(id)?.tally.receipt(account))
    }

    pub fn proposal_info_uri(&self, id: &ProposalId) -> Result<Option<&str>> {
        Ok(self.proposal(id)?.core.info_uri.as_deref())
    }

    pub fn set_proposal_info_uri(&mut self, caller: &Address, id: &ProposalId, uri: impl Into<String>) -> Result<()> {
        let record = self
            .store
            .get_mut(id)
            .ok_or(GovernanceError::UnknownProposal(*id))?;
        if *caller != record.core.proposer {
            return Err(GovernanceError::NotProposer);
        }
        if record.core.is_finalized() {
            return Err(GovernanceError::ProposalFinalized(*id));
        }
        let uri = uri.into();
        record.core.info_uri = Some(uri.clone());
        self.events.push(GovernorEvent::ProposalInfoUriChanged { id: *id, uri });
        Ok(())
    }

    fn queue_status(&self, core: &ProposalCore) -> QueueStatus {
        let (Some(timelock), Some(_)) = (&self.timelock, core.eta) else {
            return QueueStatus::Unqueued;
        };
        let op_id = Timelock::hash_operation_batch(&core.actions.calls(), &H256::zero(), &core.description_hash);
        match timelock.operation(&op_id) {
            Some(op) => match op.status {
                OperationStatus::Pending => QueueStatus::Waiting {
                    eta: op.ready_at,
                    grace_period: timelock.grace_period(),
                },
                OperationStatus::Done => QueueStatus::Done,
                OperationStatus::Canceled => QueueStatus::Canceled,
            },
            None => QueueStatus::Unqueued,
        }
    }

    pub fn state(&self, sources: &dyn SourceRegistry, id: &ProposalId, block: &Block) -> Result<ProposalState> {
        let record = self.proposal(id)?;
        let quorum = self.proposal_quorum(sources, id)?;
        let state = compute_state(&record.core, &record.tally, block, quorum, self.queue_status(&record.core));
        log::debug!("proposal {} at block {}: {}", id.short(), block.number, state);
        Ok(state)
    }

    // Lifecycle

    pub fn propose(
        &mut self,
        sources: &dyn SourceRegistry,
        proposer: Address,
        request: ProposalRequest,
        block: &Block,
    ) -> Result<ProposalId> {
        self.try_propose(sources, proposer, request, block)
            .map_err(|e| rejected("propose", e))
    }

    fn try_propose(
        &mut self,
        sources: &dyn SourceRegistry,
        proposer: Address,
        request: ProposalRequest,
        block: &Block,
    ) -> Result<ProposalId> {
        let voting_token = self.registered_or_primary(request.voting_token)?;
        let votes = resolve(sources, &voting_token)?.get_votes(&proposer);
        if votes < self.settings.proposal_threshold {
            return Err(GovernanceError::BelowThreshold {
                votes,
                threshold: self.settings.proposal_threshold,
            });
        }

        request.actions.validate()?;
        let description_hash = hash_description(&request.description);
        let id = request.actions.proposal_id(&description_hash);
        if self.store.contains(&id) {
            return Err(GovernanceError::ProposalAlreadyExists(id));
        }

        let vote_start = block.number.saturating_add(self.settings.voting_delay);
        let vote_end = vote_start.saturating_add(self.settings.voting_period);
        let core = ProposalCore {
            id,
            proposer,
            actions: request.actions,
            description: request.description,
            description_hash,
            created_at: block.number,
            vote_start,
            vote_end,
            voting_token,
            canceled: false,
            executed: false,
            info_uri: request.info_uri,
            eta: None,
        };
        self.events.push(GovernorEvent::ProposalCreated {
            id,
            proposer,
            voting_token,
            vote_start,
            vote_end,
            description: core.description.clone(),
        });
        self.store.insert(ProposalRecord::new(core));

        log::info!(
            "📝 proposal {} created by {} (votes {}..={}, token {})",
            id.short(),
            proposer.short(),
            vote_start,
            vote_end,
            voting_token.short()
        );
        Ok(id)
    }

    pub fn cast_vote(
        &mut self,
        sources: &dyn SourceRegistry,
        voter: Address,
        id: &ProposalId,
        support: u8,
        block: &Block,
    ) -> Result<u128> {
        self.cast(sources, voter, id, support, None, None, block)
            .map_err(|e| rejected("cast_vote", e))
    }

    pub fn cast_vote_with_reason(
        &mut self,
        sources: &dyn SourceRegistry,
        voter: Address,
        id: &ProposalId,
        support: u8,
        reason: impl Into<String>,
        block: &Block,
    ) -> Result<u128> {
        self.cast(sources, voter, id, support, Some(reason.into()), None, block)
            .map_err(|e| rejected("cast_vote", e))
    }

    pub fn cast_ballot(
        &mut self,
        sources: &dyn SourceRegistry,
        voter: Address,
        ballot: Ballot,
        block: &Block,
    ) -> Result<u128> {
        self.cast(
            sources,
            voter,
            &ballot.proposal_id,
            ballot.support as u8,
            ballot.reason,
            ballot.token,
            block,
        )
        .map_err(|e| rejected("cast_vote", e))
    }

    #[allow(clippy::too_many_arguments)]
    fn cast(
        &mut self,
        sources: &dyn SourceRegistry,
        voter: Address,
        id: &ProposalId,
        support: u8,
        reason: Option<String>,
        token: Option<Address>,
        block: &Block,
    ) -> Result<u128> {
        let state = self.state(sources, id, block)?;
        if state != ProposalState::Active {
            return Err(GovernanceError::VotingClosed { state });
        }

        let record = self.proposal(id)?;
        let pinned = record.core.voting_token;
        let snapshot = snapshot_block(&record.core);
        if let Some(token) = token {
            if token != pinned {
                return Err(GovernanceError::TokenMismatch {
                    expected: pinned,
                    got: token,
                });
            }
        }

        let past_votes = |source: &dyn VotingPowerSource| snapshot.map_or(0, |b| source.get_past_votes(&voter, b));
        let weight = past_votes(resolve(sources, &pinned)?);
        if token.is_none() && weight == 0 {
            let holds_other = self.tokens.iter().filter(|t| **t != pinned).find(|t| {
                resolve(sources, t)
                    .map(|s| past_votes(s) > 0)
                    .unwrap_or(false)
            });
            if let Some(other) = holds_other {
                return Err(GovernanceError::TokenMismatch {
                    expected: pinned,
                    got: *other,
                });
            }
        }

        if record.tally.has_voted(&voter) {
            return Err(GovernanceError::AlreadyVoted {
                voter,
                proposal_id: *id,
            });
        }
        let support = VoteType::try_from(support)?;

        let record = self
            .store
            .get_mut(id)
            .ok_or(GovernanceError::UnknownProposal(*id))?;
        record.tally.count_vote(
            id,
            voter,
            VoteReceipt {
                support,
                weight,
                reason: reason.clone(),
                block: block.number,
            },
        )?;
        self.events.push(GovernorEvent::VoteCast {
            voter,
            id: *id,
            support,
            weight,
            reason,
        });
        log::info!("🗳️  {} voted {} on {} with weight {}", voter.short(), support, id.short(), weight);
        Ok(weight)
    }

    /// Schedule a succeeded proposal in the timelock.
    pub fn queue(
        &mut self,
        sources: &dyn SourceRegistry,
        actions: &ProposalActions,
        description_hash: &H256,
        block: &Block,
    ) -> Result<ProposalId> {
        self.try_queue(sources, actions, description_hash, block)
            .map_err(|e| rejected("queue", e))
    }

    fn try_queue(
        &mut self,
        sources: &dyn SourceRegistry,
        actions: &ProposalActions,
        description_hash: &H256,
        block: &Block,
    ) -> Result<ProposalId> {
        let id = actions.proposal_id(description_hash);
        let state = self.state(sources, &id, block)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::ProposalNotSuccessful { state });
        }
        let timelock = self.timelock.as_mut().ok_or(GovernanceError::NoTimelock)?;
        let delay = timelock.min_delay();
        let (_, eta) = timelock.schedule(
            &self.address,
            &actions.calls(),
            &H256::zero(),
            description_hash,
            delay,
            block.timestamp,
        )?;

        if let Some(record) = self.store.get_mut(&id) {
            record.core.eta = Some(eta);
        }
        self.events.push(GovernorEvent::ProposalQueued { id, eta });
        log::info!("⏳ proposal {} queued, executable at {}", id.short(), eta);
        Ok(id)
    }

    /// Run a successful proposal's calls through `executor`, exactly once.
    pub fn execute<E: CallExecutor + ?Sized>(
        &mut self,
        sources: &dyn SourceRegistry,
        actions: &ProposalActions,
        description_hash: &H256,
        block: &Block,
        executor: &mut E,
    ) -> Result<ProposalId> {
        self.try_execute(sources, actions, description_hash, block, executor)
            .map_err(|e| rejected("execute", e))
    }

    fn try_execute<E: CallExecutor + ?Sized>(
        &mut self,
        sources: &dyn SourceRegistry,
        actions: &ProposalActions,
        description_hash: &H256,
        block: &Block,
        executor: &mut E,
    ) -> Result<ProposalId> {
        let id = actions.proposal_id(description_hash);
        let state = self.state(sources, &id, block)?;
        if state == ProposalState::Executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }

        let calls = actions.calls();
        match self.timelock.as_mut() {
            Some(timelock) => {
                if state != ProposalState::Queued {
                    return Err(GovernanceError::ProposalNotSuccessful { state });
                }
                timelock.execute(
                    &self.address,
                    &calls,
                    &H256::zero(),
                    description_hash,
                    block.timestamp,
                    executor,
                )?;
            }
            None => {
                if state != ProposalState::Succeeded {
                    return Err(GovernanceError::ProposalNotSuccessful { state });
                }
                executor.execute_batch(&self.address, &calls)?;
            }
        }

        if let Some(record) = self.store.get_mut(&id) {
            record.core.executed = true;
        }
        self.events.push(GovernorEvent::ProposalExecuted { id });
        log::info!("✅ proposal {} executed ({} call(s))", id.short(), calls.len());
        Ok(id)
    }

    /// Cancel a proposal that is neither executed, canceled nor expired.
    /// Only the proposer or the governor owner may cancel.
    pub fn cancel(
        &mut self,
        sources: &dyn SourceRegistry,
        caller: &Address,
        actions: &ProposalActions,
        description_hash: &H256,
        block: &Block,
    ) -> Result<ProposalId> {
        self.try_cancel(sources, caller, actions, description_hash, block)
            .map_err(|e| rejected("cancel", e))
    }

    fn try_cancel(
        &mut self,
        sources: &dyn SourceRegistry,
        caller: &Address,
        actions: &ProposalActions,
        description_hash: &H256,
        block: &Block,
    ) -> Result<ProposalId> {
        let id = actions.proposal_id(description_hash);
        let proposer = self.proposal_proposer(&id)?;
        if *caller != proposer && *caller != self.owner {
            return Err(GovernanceError::NotProposerOrOwner);
        }

        let state = self.state(sources, &id, block)?;
        match state {
            ProposalState::Executed => return Err(GovernanceError::AlreadyExecuted(id)),
            ProposalState::Canceled | ProposalState::Expired => {
                return Err(GovernanceError::ProposalNotActive { state })
            }
            _ => {}
        }

        if state == ProposalState::Queued {
            if let Some(timelock) = self.timelock.as_mut() {
                let op_id = Timelock::hash_operation_batch(&actions.calls(), &H256::zero(), description_hash);
                timelock.cancel(&self.address, &op_id)?;
            }
        }

        if let Some(record) = self.store.get_mut(&id) {
            record.core.canceled = true;
        }
        self.events.push(GovernorEvent::ProposalCanceled { id });
        log::info!("🚫 proposal {} canceled by {}", id.short(), caller.short());
        Ok(id)
    }
}
