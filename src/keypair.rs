//! Ephemeral ECDSA P-256 keypairs with dual expiry.
//!
//! Every login session gets a fresh keypair. A keypair stops being usable
//! when either its wall-clock deadline passes or the chain advances past
//! its epoch bound, whichever comes first. Signatures are IEEE P1363
//! format (raw r||s, 64 bytes).

use chrono::{DateTime, Duration, Utc};
use ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};

use crate::base64url;
use crate::error::{Result, ZkLoginError};

/// Wall-clock lifetime of an ephemeral keypair and its session.
pub const SESSION_DURATION_SECS: i64 = 24 * 60 * 60;

/// Chain epochs a keypair stays valid beyond the epoch it was minted in.
pub const MAX_SESSION_EPOCHS: u64 = 2;

#[derive(Clone)]
pub struct EphemeralKeyPair {
    signing_key: SigningKey,
    /// SEC1 compressed point (33 bytes).
    public_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Last chain epoch this key may sign in.
    pub max_epoch: u64,
}

impl EphemeralKeyPair {
    /// Generate a fresh keypair valid from `now` until both bounds run out.
    ///
    /// # Arguments
    /// * `now` - Creation instant; the wall-clock deadline is derived from it
    /// * `current_epoch` - The chain epoch estimate at creation time
    pub fn generate(now: DateTime<Utc>, current_epoch: u64) -> Self {
        let signing_key = SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng);
        let public_key = signing_key.verifying_key().to_encoded_point(true).as_bytes().to_vec();
        EphemeralKeyPair {
            signing_key,
            public_key,
            created_at: now,
            expires_at: now + Duration::seconds(SESSION_DURATION_SECS),
            max_epoch: current_epoch.saturating_add(MAX_SESSION_EPOCHS),
        }
    }

    /// SEC1 compressed public key bytes.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Public key as unpadded base64url, the form sent to external services.
    pub fn public_key_base64(&self) -> String {
        base64url::encode(&self.public_key)
    }

    /// Sign a message with ECDSA P-256 + SHA-256.
    ///
    /// # Returns
    /// 64-byte IEEE P1363 signature (r||s)
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = self
            .signing_key
            .try_sign(message)
            .map_err(|e| ZkLoginError::Signing(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_epoch_expired(&self, current_epoch: u64) -> bool {
        current_epoch > self.max_epoch
    }

    /// Usable only while neither bound has run out.
    pub fn is_valid(&self, now: DateTime<Utc>, current_epoch: u64) -> bool {
        !self.is_expired(now) && !self.is_epoch_expired(current_epoch)
    }
}

// The secret scalar stays out of logs and debug dumps.
impl std::fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("public_key", &hex::encode(&self.public_key))
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("max_epoch", &self.max_epoch)
            .finish()
    }
}
