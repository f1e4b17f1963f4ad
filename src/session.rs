//! Login session state: ephemeral key, token, salt, proof, and the
//! derived address, collected as the flow advances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::error::{Result, ZkLoginError};
use crate::jwt::Jwt;
use crate::keypair::EphemeralKeyPair;
use crate::provider::{Network, OAuthProvider};

// ============================================================================
// ZkProof — output of the proving service
// ============================================================================

/// Zero-knowledge proof binding a JWT to an ephemeral key, as returned by
/// the proving service. The proof blob itself is opaque; the public inputs
/// are what the chain verifier checks it against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZkProof {
    pub proof: Value,
    pub public_input_hash: String,
    pub issuer: String,
    pub max_epoch: u64,
    /// Base64url compressed public key of the ephemeral keypair.
    pub ephemeral_public_key: String,
}

// ============================================================================
// AuthStage — how far a login attempt has progressed
// ============================================================================

/// Derived from which session fields are populated; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    /// Authorization URL issued, no callback yet.
    AwaitingCallback,
    /// Identity token attached.
    CallbackHandled,
    /// User salt attached.
    SaltIssued,
    /// Proof attached.
    ProofIssued,
    /// Address derived; the session can sign.
    Complete,
}

// ============================================================================
// ZkLoginSession
// ============================================================================

#[derive(Debug, Clone)]
pub struct ZkLoginSession {
    pub id: String,
    pub provider: OAuthProvider,
    pub network: Network,
    pub key_pair: EphemeralKeyPair,
    /// Randomness mixed into the nonce; the proving service re-derives the
    /// nonce from it.
    pub jwt_randomness: Vec<u8>,
    pub nonce: String,
    pub jwt: Option<Jwt>,
    pub user_salt: Option<String>,
    pub address: Option<String>,
    pub proof: Option<ZkProof>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ZkLoginSession {
    pub fn new(
        provider: OAuthProvider,
        network: Network,
        key_pair: EphemeralKeyPair,
        jwt_randomness: Vec<u8>,
        nonce: String,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = key_pair.expires_at;
        ZkLoginSession {
            id: Uuid::new_v4().to_string(),
            provider,
            network,
            key_pair,
            jwt_randomness,
            nonce,
            jwt: None,
            user_salt: None,
            address: None,
            proof: None,
            created_at: now,
            expires_at,
        }
    }

    pub fn stage(&self) -> AuthStage {
        if self.address.is_some() {
            AuthStage::Complete
        } else if self.proof.is_some() {
            AuthStage::ProofIssued
        } else if self.user_salt.is_some() {
            AuthStage::SaltIssued
        } else if self.jwt.is_some() {
            AuthStage::CallbackHandled
        } else {
            AuthStage::AwaitingCallback
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Record the derived address. A session can only carry an address once
    /// it has both the identity token and the salt that produced it.
    pub fn attach_address(&mut self, address: String) -> Result<()> {
        if self.jwt.is_none() || self.user_salt.is_none() {
            return Err(ZkLoginError::SessionNotAuthenticated);
        }
        self.address = Some(address);
        Ok(())
    }

    /// Rotate the ephemeral keypair and push out both expiry bounds.
    ///
    /// The identity token, salt, and address carry over. The proof does not:
    /// it is bound to the replaced key and must be requested again.
    pub fn refresh(&mut self, now: DateTime<Utc>, current_epoch: u64) -> Result<()> {
        if self.jwt.is_none() {
            return Err(ZkLoginError::SessionNotAuthenticated);
        }
        let key_pair = EphemeralKeyPair::generate(now, current_epoch);
        self.expires_at = key_pair.expires_at;
        self.key_pair = key_pair;
        self.proof = None;
        Ok(())
    }
}

// The salt is what links the OAuth identity to the address; scrub it when
// the session goes away.
impl Drop for ZkLoginSession {
    fn drop(&mut self) {
        self.user_salt.zeroize();
        self.jwt_randomness.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_jwt() -> Jwt {
        let encode = |v: &Value| crate::base64url::encode(v.to_string().as_bytes());
        let token = format!(
            "{}.{}.{}",
            encode(&json!({"alg": "RS256"})),
            encode(&json!({
                "iss": "https://accounts.google.com",
                "aud": "client-1",
                "sub": "user-1",
            })),
            crate::base64url::encode(b"sig"),
        );
        Jwt::parse(&token).unwrap()
    }

    fn sample_proof(key_pair: &EphemeralKeyPair) -> ZkProof {
        ZkProof {
            proof: json!({"a": "0x1", "b": "0x2", "c": "0x3"}),
            public_input_hash: "1234567890".to_string(),
            issuer: "https://accounts.google.com".to_string(),
            max_epoch: key_pair.max_epoch,
            ephemeral_public_key: key_pair.public_key_base64(),
        }
    }

    fn fresh_session() -> ZkLoginSession {
        let now = Utc::now();
        let key_pair = EphemeralKeyPair::generate(now, 10);
        ZkLoginSession::new(
            OAuthProvider::Google,
            Network::Testnet,
            key_pair,
            vec![9u8; 16],
            "hTPpgF7XAKbW37rEUS6pEVZqmoI".to_string(),
            now,
        )
    }

    #[test]
    fn stage_tracks_populated_fields() {
        let mut session = fresh_session();
        assert_eq!(session.stage(), AuthStage::AwaitingCallback);

        session.jwt = Some(sample_jwt());
        assert_eq!(session.stage(), AuthStage::CallbackHandled);

        session.user_salt = Some("salt-xyz".to_string());
        assert_eq!(session.stage(), AuthStage::SaltIssued);

        session.proof = Some(sample_proof(&session.key_pair));
        assert_eq!(session.stage(), AuthStage::ProofIssued);

        session.attach_address("0xabc".to_string()).unwrap();
        assert_eq!(session.stage(), AuthStage::Complete);
    }

    #[test]
    fn address_requires_token_and_salt() {
        let mut session = fresh_session();
        assert!(matches!(
            session.attach_address("0xabc".to_string()),
            Err(ZkLoginError::SessionNotAuthenticated)
        ));

        session.jwt = Some(sample_jwt());
        assert!(session.attach_address("0xabc".to_string()).is_err());

        session.user_salt = Some("salt-xyz".to_string());
        assert!(session.attach_address("0xabc".to_string()).is_ok());
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(fresh_session().id, fresh_session().id);
    }

    #[test]
    fn expiry_matches_keypair_deadline() {
        let session = fresh_session();
        assert_eq!(session.expires_at, session.key_pair.expires_at);
        assert!(!session.is_expired(session.expires_at - chrono::Duration::seconds(1)));
        assert!(session.is_expired(session.expires_at));
    }

    #[test]
    fn refresh_requires_identity_token() {
        let mut session = fresh_session();
        assert!(matches!(
            session.refresh(Utc::now(), 11),
            Err(ZkLoginError::SessionNotAuthenticated)
        ));
    }

    #[test]
    fn refresh_rotates_key_and_drops_proof() {
        let mut session = fresh_session();
        session.jwt = Some(sample_jwt());
        session.user_salt = Some("salt-xyz".to_string());
        session.proof = Some(sample_proof(&session.key_pair));
        session.attach_address("0xabc".to_string()).unwrap();

        let old_public_key = session.key_pair.public_key().to_vec();
        let old_expiry = session.expires_at;
        let old_nonce = session.nonce.clone();

        let later = Utc::now() + chrono::Duration::hours(20);
        session.refresh(later, 14).unwrap();

        assert_ne!(session.key_pair.public_key(), old_public_key.as_slice());
        assert!(session.expires_at > old_expiry);
        assert_eq!(session.key_pair.max_epoch, 16);
        assert!(session.proof.is_none());
        // Identity state survives the rotation.
        assert!(session.jwt.is_some());
        assert_eq!(session.user_salt.as_deref(), Some("salt-xyz"));
        assert_eq!(session.address.as_deref(), Some("0xabc"));
        assert_eq!(session.nonce, old_nonce);
    }
}
