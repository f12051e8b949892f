use dao_core::{Address, TOKEN_UNIT};
use dao_votes::*;

fn addr(label: &str) -> Address {
    Address::from_label(label)
}

#[test]
fn test_delegate_to_second_account() {
    let owner = addr("owner");
    let delegatee = addr("addr1");
    let mut token = GovernanceToken::new(addr("gt"), "Governor Token", "GT", owner, 1_000_000 * TOKEN_UNIT, 0);
    token.delegate(owner, owner, 1);

    assert_eq!(token.get_votes(&delegatee), 0);
    token.delegate(owner, delegatee, 2);
    assert_eq!(token.get_votes(&delegatee), 1_000_000 * TOKEN_UNIT);
    assert_eq!(token.get_votes(&owner), 0);
    assert_eq!(token.delegates(&owner), Some(delegatee));
}

#[test]
fn test_snapshot_immune_to_later_transfers() {
    let owner = addr("owner");
    let voter = addr("voter");
    let mut token = GovernanceToken::new(addr("gt"), "Governor Token", "GT", owner, 1_000 * TOKEN_UNIT, 0);
    token.transfer(owner, voter, 400 * TOKEN_UNIT, 1).unwrap();
    token.delegate(voter, voter, 1);

    let snapshot = 3;
    token.transfer(voter, owner, 400 * TOKEN_UNIT, 5).unwrap();

    assert_eq!(token.get_past_votes(&voter, snapshot), 400 * TOKEN_UNIT);
    assert_eq!(token.get_votes(&voter), 0);
    assert_eq!(token.get_past_total_supply(snapshot), 1_000 * TOKEN_UNIT);
}

#[test]
fn test_nft_count_weighting_through_ledger() {
    let owner = addr("owner");
    let voter = addr("voter");
    let mut ledger = TokenLedger::new();
    let nft_addr = ledger.insert(GovernanceNft::new(addr("gnft"), "Governance NFT", "GNFT", 1_000, owner));

    let nft = ledger.nft_mut(&nft_addr).unwrap();
    nft.reserve(&owner, 100, 1).unwrap();
    nft.transfer_many(owner, voter, 4, 1).unwrap();
    ledger.get_mut(&nft_addr).unwrap().delegate(voter, voter, 2);

    let source = ledger.source(&nft_addr).unwrap();
    assert_eq!(source.kind(), SourceKind::NonFungible);
    assert_eq!(source.get_votes(&voter), 4);
    assert_eq!(source.get_past_votes(&voter, 1), 0);
    assert_eq!(source.get_past_total_supply(2), 100);
}
