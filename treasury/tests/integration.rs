use dao_core::{encode_call, Address, Call, CallExecutor, ContractRegistry, Revert, Token};
use treasury::{Treasury, EXECUTE_SIGNATURE, RELEASE_SIGNATURE};

fn governor() -> Address {
    Address::from_label("governor")
}

fn setup() -> (ContractRegistry<Treasury>, Address) {
    let address = Address::from_label("treasury");
    let mut registry = ContractRegistry::new();
    registry.deploy(Treasury::new(address, governor()));
    (registry, address)
}

#[test]
fn test_batch_funds_and_releases() {
    let (mut registry, address) = setup();
    let alice = Address::from_label("alice");
    let calls = vec![
        Call {
            target: address,
            value: 1_000,
            calldata: Vec::new(),
        },
        Call {
            target: address,
            value: 0,
            calldata: encode_call(RELEASE_SIGNATURE, &[Token::Address(alice), Token::Uint(400)]),
        },
        Call {
            target: address,
            value: 0,
            calldata: encode_call(EXECUTE_SIGNATURE, &[]),
        },
    ];

    registry.execute_batch(&governor(), &calls).unwrap();

    let t = registry.get(&address).unwrap();
    assert_eq!(t.balance(), 600);
    assert_eq!(t.executed_proposals(), 1);
    assert_eq!(t.releases().len(), 1);
}

#[test]
fn test_failed_release_rolls_back_batch() {
    let (mut registry, address) = setup();
    let calls = vec![
        Call {
            target: address,
            value: 0,
            calldata: encode_call(EXECUTE_SIGNATURE, &[]),
        },
        Call {
            target: address,
            value: 0,
            calldata: encode_call(
                RELEASE_SIGNATURE,
                &[Token::Address(Address::from_label("alice")), Token::Uint(1)],
            ),
        },
    ];

    let err = registry.execute_batch(&governor(), &calls).unwrap_err();
    assert!(matches!(err, Revert::Reverted { index: 1, .. }));
    assert_eq!(registry.get(&address).unwrap().executed_proposals(), 0);
}

#[test]
fn test_state_serializes() {
    let (mut registry, address) = setup();
    registry
        .execute_batch(
            &governor(),
            &[Call {
                target: address,
                value: 0,
                calldata: encode_call(EXECUTE_SIGNATURE, &[]),
            }],
        )
        .unwrap();
    let json = serde_json::to_string(&registry).unwrap();
    let restored: ContractRegistry<Treasury> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.get(&address).unwrap().executed_proposals(), 1);
}
