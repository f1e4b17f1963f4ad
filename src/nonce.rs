//! OAuth nonce binding for ephemeral keys.
//!
//! The nonce sent to the OpenID provider commits to the ephemeral public
//! key, the epoch bound, and fresh per-login randomness. The provider
//! signs it into the JWT, which is what lets a proof tie the token to
//! exactly one keypair.

use sha2::{Digest, Sha256};

use crate::base64url;
use crate::error::{Result, ZkLoginError};

/// Nonce length in characters, the size the supported providers accept.
pub const NONCE_LENGTH: usize = 27;

/// Bytes of per-login randomness mixed into the nonce.
pub const RANDOMNESS_LENGTH: usize = 16;

/// Generate fresh nonce randomness.
///
/// Must be fresh per login attempt; reuse would let an observer link the
/// resulting sessions.
pub fn generate_randomness() -> Result<[u8; RANDOMNESS_LENGTH]> {
    let mut bytes = [0u8; RANDOMNESS_LENGTH];
    getrandom::getrandom(&mut bytes).map_err(|e| ZkLoginError::RngFailed(e.to_string()))?;
    Ok(bytes)
}

/// Bind an ephemeral public key and epoch bound into a nonce.
///
/// Hashes `public_key || max_epoch(BE) || randomness`, encodes the digest
/// as base64url, and truncates to [`NONCE_LENGTH`]. The exact hash must
/// match what the target chain's verifier recomputes; a chain that mandates
/// an algebraic hash needs this function (and only this function) swapped.
/// Callers depend on determinism and the fixed output shape, not on the
/// algorithm.
pub fn bind_nonce(public_key: &[u8], max_epoch: u64, randomness: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(public_key);
    hasher.update(max_epoch.to_be_bytes());
    hasher.update(randomness);
    let digest = hasher.finalize();

    let mut nonce = base64url::encode(&digest);
    nonce.truncate(NONCE_LENGTH);
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> Vec<u8> {
        let mut key = vec![0x02u8];
        key.extend_from_slice(&[0xabu8; 32]);
        key
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let key = sample_key();
        let randomness = [7u8; RANDOMNESS_LENGTH];
        assert_eq!(
            bind_nonce(&key, 12, &randomness),
            bind_nonce(&key, 12, &randomness)
        );
    }

    #[test]
    fn fixed_length_and_url_safe() {
        let nonce = bind_nonce(&sample_key(), u64::MAX, &[0u8; RANDOMNESS_LENGTH]);
        assert_eq!(nonce.len(), NONCE_LENGTH);
        assert!(nonce
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn every_input_changes_the_nonce() {
        let key = sample_key();
        let randomness = [1u8; RANDOMNESS_LENGTH];
        let base = bind_nonce(&key, 5, &randomness);

        let mut other_key = key.clone();
        other_key[1] ^= 0x01;
        assert_ne!(bind_nonce(&other_key, 5, &randomness), base);
        assert_ne!(bind_nonce(&key, 6, &randomness), base);
        assert_ne!(bind_nonce(&key, 5, &[2u8; RANDOMNESS_LENGTH]), base);
    }

    #[test]
    fn epoch_is_big_endian() {
        // Epochs differing only in high-order bytes must still diverge.
        let key = sample_key();
        let randomness = [3u8; RANDOMNESS_LENGTH];
        assert_ne!(
            bind_nonce(&key, 1, &randomness),
            bind_nonce(&key, 1 << 56, &randomness)
        );
    }

    #[test]
    fn randomness_is_fresh() {
        let a = generate_randomness().unwrap();
        let b = generate_randomness().unwrap();
        assert_eq!(a.len(), RANDOMNESS_LENGTH);
        assert_ne!(a, b);
    }
}
