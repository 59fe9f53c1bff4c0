//! Seed expansion for values that must be reproducible from a label: seeded keys and generated
//! sponge constants.

use sha2::{Digest, Sha256};

/// Length of a [`wide_digest`], enough to reduce into a 255-bit field without visible bias.
pub const WIDE_DIGEST_LEN: usize = 64;

/// `SHA-256(domain || 0 || input) || SHA-256(domain || 1 || input)`.
pub fn wide_digest(domain: &[u8], input: &[u8]) -> [u8; WIDE_DIGEST_LEN] {
    let mut out = [0u8; WIDE_DIGEST_LEN];
    for (block, chunk) in out.chunks_mut(32).enumerate() {
        let digest = Sha256::new()
            .chain_update(domain)
            .chain_update([block as u8])
            .chain_update(input)
            .finalize();
        chunk.copy_from_slice(&digest);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_domain_separated() {
        let a = wide_digest(b"domain-a", b"input");
        assert_eq!(a, wide_digest(b"domain-a", b"input"));
        assert_ne!(a, wide_digest(b"domain-b", b"input"));
        assert_ne!(a[..32], a[32..]);
        let first = Sha256::new_with_prefix(b"domain-a")
            .chain_update([0u8])
            .chain_update(b"input")
            .finalize();
        assert_eq!(&a[..32], first.as_slice());
    }
}
