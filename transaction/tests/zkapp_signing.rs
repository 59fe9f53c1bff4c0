use proptest::prelude::*;
use signer_crypto::{Field, NetworkId, PrivateKey};
use signer_transaction::account_update::{AccountUpdate, AccountUpdateBody, AuthorizationKind};
use signer_transaction::primitives::{Events, SetOrKeep};
use signer_transaction::{
    sign_zkapp_command, transaction_commitments, verify_zkapp_command_signature, FeePayer,
    FeePayerBody, Memo, ZkappCommand,
};

fn build(fee: u64, nonce: u32, memo: &str, depths: &[u32], seed: &[u8]) -> (PrivateKey, ZkappCommand) {
    let key = PrivateKey::from_seed(seed).unwrap();
    let public_key = key.to_public_key().unwrap();
    let account_updates = depths
        .iter()
        .enumerate()
        .map(|(i, &call_depth)| {
            let mut body = AccountUpdateBody {
                public_key,
                call_depth,
                use_full_commitment: i % 2 == 0,
                authorization_kind: AuthorizationKind::signature(),
                ..Default::default()
            };
            body.update.app_state[0] = SetOrKeep::some(Field::from_u64(i as u64));
            AccountUpdate::new(body)
        })
        .collect();
    let command = ZkappCommand {
        fee_payer: FeePayer::new(FeePayerBody {
            public_key,
            fee,
            valid_until: Some(nonce.wrapping_add(1000)),
            nonce,
        }),
        account_updates,
        memo: Memo::from_text(memo).unwrap(),
    };
    (key, command)
}

#[test]
fn events_are_covered_by_the_commitment() {
    let network = NetworkId::Testnet;
    let (key, command) = build(1_000_000, 0, "events", &[0, 1], b"events");
    let signed = sign_zkapp_command(&command, &key, &network).unwrap();
    let public_key = key.to_public_key().unwrap();
    assert!(verify_zkapp_command_signature(&signed, &public_key, &network));

    let mut tampered = signed.clone();
    tampered.account_updates[1].body.events =
        Events::empty().push(vec![Field::from_u64(1)]).unwrap();
    assert!(!verify_zkapp_command_signature(&tampered, &public_key, &network));
    assert_ne!(
        transaction_commitments(&tampered, &network).unwrap().commitment,
        transaction_commitments(&signed, &network).unwrap().commitment
    );
}

#[test]
fn reordering_siblings_changes_the_commitment() {
    let network = NetworkId::Mainnet;
    let (_, command) = build(1, 1, "", &[0, 0], b"order");
    let mut swapped = command.clone();
    swapped.account_updates.swap(0, 1);
    assert_ne!(
        transaction_commitments(&command, &network).unwrap(),
        transaction_commitments(&swapped, &network).unwrap()
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn any_field_mutation_breaks_the_fee_payer_signature(
        fee in 1u64..u64::MAX,
        nonce in 0u32..u32::MAX,
        memo in "[a-z]{0,32}",
        seed in prop::array::uniform32(any::<u8>()),
        which in 0usize..4,
    ) {
        let network = NetworkId::Testnet;
        let (key, command) = build(fee, nonce, &memo, &[0, 1, 0], &seed);
        let public_key = key.to_public_key().unwrap();
        let signed = sign_zkapp_command(&command, &key, &network).unwrap();
        prop_assert!(verify_zkapp_command_signature(&signed, &public_key, &network));

        let mut tampered = signed.clone();
        match which {
            0 => tampered.fee_payer.body.fee = fee - 1,
            1 => tampered.fee_payer.body.nonce = nonce + 1,
            2 => tampered.memo = Memo::from_text(&format!("{memo}!")).unwrap_or_default(),
            _ => tampered.account_updates[2].body.call_depth = 1,
        }
        prop_assert!(!verify_zkapp_command_signature(&tampered, &public_key, &network));
    }
}
