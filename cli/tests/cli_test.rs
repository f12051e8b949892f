//! End-to-end tests of the governor commands against a state file

use dao_cli::{deploy, run, Command, Config, Deployment};
use dao_core::TOKEN_UNIT;
use governance::{ProposalState, VoteType};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup(config: &Config) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("governor-state.json");
    deploy(config, &state, false).unwrap();
    (dir, state)
}

fn delegate(state: &Path, account: &str) {
    run(
        state,
        Command::Delegate {
            account: account.to_string(),
            to: None,
            nft: false,
        },
    )
    .unwrap();
}

fn propose(state: &Path) -> Deployment {
    run(
        state,
        Command::Propose {
            description: "Proposal #1: execute".to_string(),
            proposer: "deployer".to_string(),
            token: None,
            info_uri: None,
            value: 0,
            release_to: None,
            release_amount: None,
        },
    )
    .unwrap()
}

fn mine(state: &Path, blocks: u64) {
    run(state, Command::Mine { blocks, seconds: None }).unwrap();
}

fn vote(state: &Path, voter: &str, support: VoteType) -> anyhow::Result<Deployment> {
    run(
        state,
        Command::Vote {
            proposal: "1".to_string(),
            support,
            voter: voter.to_string(),
            reason: None,
            token: None,
        },
    )
}

fn proposal_state(state: &Path) -> ProposalState {
    let d = Deployment::load(state).unwrap();
    let id = d.proposal("1").unwrap();
    d.governor.state(&d.tokens, &id, &d.chain.head()).unwrap()
}

#[test]
fn test_full_lifecycle() {
    let (_dir, state) = setup(&Config::default());
    delegate(&state, "deployer");
    propose(&state);
    assert_eq!(proposal_state(&state), ProposalState::Pending);

    mine(&state, 1);
    vote(&state, "deployer", VoteType::For).unwrap();
    mine(&state, 6);
    assert_eq!(proposal_state(&state), ProposalState::Succeeded);

    let d = run(&state, Command::Execute { proposal: "1".to_string() }).unwrap();
    assert_eq!(d.treasury().unwrap().executed_proposals(), 1);
    assert_eq!(proposal_state(&state), ProposalState::Executed);

    assert!(run(&state, Command::Execute { proposal: "1".to_string() }).is_err());
    let d = Deployment::load(&state).unwrap();
    assert_eq!(d.treasury().unwrap().executed_proposals(), 1);
}

#[test]
fn test_deploy_refuses_to_overwrite() {
    let (_dir, state) = setup(&Config::default());
    assert!(deploy(&Config::default(), &state, false).is_err());
    assert!(deploy(&Config::default(), &state, true).is_ok());
}

#[test]
fn test_failed_command_leaves_state_untouched() {
    let (_dir, state) = setup(&Config::default());
    let before = std::fs::read_to_string(&state).unwrap();

    // the deployer has not delegated yet
    assert!(propose_result(&state).is_err());
    assert_eq!(std::fs::read_to_string(&state).unwrap(), before);
}

fn propose_result(state: &Path) -> anyhow::Result<Deployment> {
    run(
        state,
        Command::Propose {
            description: "Proposal #1: execute".to_string(),
            proposer: "deployer".to_string(),
            token: None,
            info_uri: None,
            value: 0,
            release_to: None,
            release_amount: None,
        },
    )
}

#[test]
fn test_transfer_and_double_vote() {
    let (_dir, state) = setup(&Config::default());
    run(
        &state,
        Command::Transfer {
            from: "deployer".to_string(),
            to: "alice".to_string(),
            amount: 50_000,
        },
    )
    .unwrap();
    delegate(&state, "alice");
    delegate(&state, "deployer");
    propose(&state);
    mine(&state, 1);

    let d = vote(&state, "alice", VoteType::Against).unwrap();
    let id = d.proposal("1").unwrap();
    assert_eq!(d.governor.proposal_votes(&id).unwrap(), (50_000 * TOKEN_UNIT, 0, 0));
    assert!(vote(&state, "alice", VoteType::For).is_err());

    mine(&state, 6);
    assert_eq!(proposal_state(&state), ProposalState::Defeated);
}

#[test]
fn test_nft_holder_must_vote_with_pinned_token() {
    let (_dir, state) = setup(&Config::default());
    run(&state, Command::AddToken { token: "nft".to_string() }).unwrap();
    run(&state, Command::NftReserve { count: 10 }).unwrap();
    run(
        &state,
        Command::NftTransfer {
            to: "collector".to_string(),
            count: 2,
        },
    )
    .unwrap();
    run(
        &state,
        Command::Delegate {
            account: "collector".to_string(),
            to: None,
            nft: true,
        },
    )
    .unwrap();
    delegate(&state, "deployer");
    let d = propose(&state);
    assert_eq!(d.governor.get_token_element(1).unwrap(), d.nft);
    mine(&state, 1);

    let err = vote(&state, "collector", VoteType::For).unwrap_err();
    assert!(err.to_string().contains("Proposal token should be with voting power"));
}

#[test]
fn test_timelock_lifecycle() {
    let mut config = Config::default();
    config.timelock.enabled = true;
    let (_dir, state) = setup(&config);
    delegate(&state, "deployer");
    propose(&state);
    mine(&state, 1);
    vote(&state, "deployer", VoteType::For).unwrap();
    mine(&state, 6);

    run(&state, Command::Queue { proposal: "1".to_string() }).unwrap();
    assert_eq!(proposal_state(&state), ProposalState::Queued);
    assert!(run(&state, Command::Execute { proposal: "1".to_string() }).is_err());

    run(
        &state,
        Command::Mine {
            blocks: 1,
            seconds: Some(config.timelock.min_delay),
        },
    )
    .unwrap();
    let d = run(&state, Command::Execute { proposal: "1".to_string() }).unwrap();
    assert_eq!(d.treasury().unwrap().executed_proposals(), 1);
}

#[test]
fn test_cancel_and_queries() {
    let (_dir, state) = setup(&Config::default());
    delegate(&state, "deployer");
    propose(&state);

    assert!(run(
        &state,
        Command::Cancel {
            proposal: "1".to_string(),
            caller: "mallory".to_string(),
        }
    )
    .is_err());
    run(
        &state,
        Command::Cancel {
            proposal: "1".to_string(),
            caller: "deployer".to_string(),
        },
    )
    .unwrap();
    assert_eq!(proposal_state(&state), ProposalState::Canceled);

    run(&state, Command::List).unwrap();
    run(&state, Command::Info).unwrap();
    run(&state, Command::State { proposal: "1".to_string() }).unwrap();
    run(&state, Command::Accounts { accounts: vec![] }).unwrap();
    assert!(run(&state, Command::State { proposal: "2".to_string() }).is_err());
}

#[test]
fn test_claim_list() {
    let (_dir, state) = setup(&Config::default());
    run(
        &state,
        Command::ClaimList {
            accounts: vec!["bob".to_string()],
            amount: 100,
        },
    )
    .unwrap();
    assert!(run(
        &state,
        Command::Claim {
            account: "bob".to_string(),
            amount: 101,
        }
    )
    .is_err());
    let d = run(
        &state,
        Command::Claim {
            account: "bob".to_string(),
            amount: 100,
        },
    )
    .unwrap();
    let bob = d.account("bob").unwrap();
    assert_eq!(d.tokens.get(&d.token).unwrap().balance_of(&bob), 100 * TOKEN_UNIT);
}
