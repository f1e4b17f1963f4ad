//! Chain address derivation for authenticated identities.
//!
//! The address commits to who the user is (issuer, key claim), which app
//! they logged into (client id), and their private salt. Without the salt
//! the mapping from OAuth identity to address cannot be reproduced, which
//! is what keeps the two unlinkable on chain.

use sha2::{Digest, Sha256};

use crate::error::{Result, ZkLoginError};
use crate::jwt::Jwt;

/// Address scheme flag, mixed into the second hash stage.
pub const ZKLOGIN_ADDRESS_FLAG: u8 = 0x05;

/// Claim that names the on-chain identity unless a caller overrides it.
pub const DEFAULT_KEY_CLAIM: &str = "sub";

// Claim values never contain NUL, so fields cannot bleed into each other.
const FIELD_SEPARATOR: [u8; 1] = [0x00];

/// Everything address derivation depends on. Same components, same address,
/// on every device and in every release.
///
/// `subject_id` always carries the token's `sub`; the key-claim pair is
/// what gets hashed and equals (`"sub"`, `subject_id`) unless a caller
/// picks a different claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressComponents {
    pub issuer: String,
    pub client_id: String,
    pub subject_id: String,
    pub key_claim_name: String,
    pub key_claim_value: String,
    pub user_salt: String,
}

impl AddressComponents {
    /// Assemble components from a decoded token and the user's salt, using
    /// the default key claim.
    pub fn from_jwt(jwt: &Jwt, user_salt: &str) -> Result<Self> {
        let client_id = jwt
            .audience()
            .ok_or_else(|| ZkLoginError::MalformedJwt("empty audience".to_string()))?;
        Ok(AddressComponents {
            issuer: jwt.claims.iss.clone(),
            client_id: client_id.to_string(),
            subject_id: jwt.claims.sub.clone(),
            key_claim_name: DEFAULT_KEY_CLAIM.to_string(),
            key_claim_value: jwt.claims.sub.clone(),
            user_salt: user_salt.to_string(),
        })
    }
}

/// Derive the on-chain address for an identity.
///
/// Two stages: an inner hash over the NUL-separated identity fields, then
/// an outer hash over `flag || issuer || inner`. The full 32-byte digest is
/// rendered as `0x` plus 64 lowercase hex characters.
pub fn derive_address(components: &AddressComponents) -> String {
    let mut inner = Sha256::new();
    inner.update(components.key_claim_name.as_bytes());
    inner.update(FIELD_SEPARATOR);
    inner.update(components.key_claim_value.as_bytes());
    inner.update(FIELD_SEPARATOR);
    inner.update(components.client_id.as_bytes());
    inner.update(FIELD_SEPARATOR);
    inner.update(components.user_salt.as_bytes());
    inner.update(FIELD_SEPARATOR);
    inner.update(components.issuer.as_bytes());
    let identity_digest = inner.finalize();

    let mut outer = Sha256::new();
    outer.update([ZKLOGIN_ADDRESS_FLAG]);
    outer.update(components.issuer.as_bytes());
    outer.update(identity_digest);

    format!("0x{}", hex::encode(outer.finalize()))
}
