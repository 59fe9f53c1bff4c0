use std::fs;

use tempfile::tempdir;
use wallet::{Client, Payment, SignerConfig, Signed, WalletError};

#[test]
fn config_file_drives_network_and_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("signer.json");
    fs::write(
        &path,
        r#"{ "network": "testnet", "defaultValidUntil": 5000, "berkeleyHashes": false }"#,
    )
    .expect("write config");
    let client = Client::new(SignerConfig::load(&path).expect("load config"));
    let sender = client.gen_keys().expect("keys");
    let receiver = client.gen_keys().expect("keys");

    let payment: Payment = serde_json::from_str(&format!(
        r#"{{ "to": "{}", "from": "{}", "amount": "1000000000", "fee": 10000000, "nonce": "3", "memo": "rent" }}"#,
        receiver.public_key, sender.public_key
    ))
    .expect("parse payment");
    let signed = client
        .sign_payment(&payment, &sender.private_key)
        .expect("sign payment");
    assert_eq!(signed.data.valid_until, Some(5000));

    // Through JSON and back, as a caller would ship it.
    let wire = serde_json::to_string(&signed).expect("serialize");
    let parsed: Signed<Payment> = serde_json::from_str(&wire).expect("deserialize");
    assert!(client.verify_payment(&parsed));

    let configured = client.hash_payment(&parsed, None).expect("hash");
    let legacy = client.hash_payment(&parsed, Some(false)).expect("hash");
    let current = client.hash_payment(&parsed, Some(true)).expect("hash");
    assert_eq!(configured, legacy);
    assert_ne!(configured, current);
}

#[test]
fn long_memo_is_rejected_when_signing() {
    let client = Client::default();
    let sender = client.gen_keys().expect("keys");
    let payment = Payment {
        to: sender.public_key.clone(),
        from: sender.public_key.clone(),
        amount: 1,
        fee: 1,
        nonce: 0,
        memo: Some("x".repeat(33)),
        valid_until: None,
    };
    let err = client
        .sign_payment(&payment, &sender.private_key)
        .expect_err("memo over 32 bytes");
    assert!(matches!(err, WalletError::Transaction(_)));
}

#[test]
fn wrong_private_key_cannot_sign_for_sender() {
    let client = Client::default();
    let sender = client.gen_keys().expect("keys");
    let other = client.gen_keys().expect("keys");
    let payment = Payment {
        to: other.public_key.clone(),
        from: sender.public_key.clone(),
        amount: 1,
        fee: 1,
        nonce: 0,
        memo: None,
        valid_until: None,
    };
    let signed = client
        .sign_payment(&payment, &other.private_key)
        .expect("signing itself succeeds");
    assert!(!client.verify_payment(&signed));
}
