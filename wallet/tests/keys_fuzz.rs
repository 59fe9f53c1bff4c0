use proptest::prelude::*;
use protocol_codec::Base58Check;
use rand::rngs::StdRng;
use rand::SeedableRng;
use signer_crypto::NetworkId;
use wallet::{derive_public_key, gen_keys, public_key_from_raw, public_key_to_raw, verify_keypair};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn generated_keypairs_verify_on_every_network(seed in any::<u64>(), name in "[a-z]{1,12}") {
        let mut rng = StdRng::seed_from_u64(seed);
        let keys = gen_keys(&mut rng).expect("keys");
        prop_assert_eq!(derive_public_key(&keys.private_key).expect("derive"), keys.public_key.clone());
        for network in [NetworkId::Mainnet, NetworkId::Testnet, NetworkId::Custom(name.clone())] {
            prop_assert!(verify_keypair(&keys, &network));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn raw_public_keys_invert(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let keys = gen_keys(&mut rng).expect("keys");
        let public_key = signer_crypto::PublicKey::from_base58(&keys.public_key).expect("decode");
        let raw = public_key_to_raw(&public_key);
        prop_assert_eq!(public_key_from_raw(&raw).expect("raw"), public_key);
    }
}
