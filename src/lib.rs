//! zkLogin authentication session management.
//!
//! This crate binds an OAuth/OIDC login to a short-lived signing key and
//! derives the on-chain address for the authenticated identity:
//! - Provider registry (Google, Facebook, Twitch, Microsoft) with
//!   per-network availability
//! - Ephemeral P-256 keypairs with wall-clock and chain-epoch expiry
//! - Nonce binding of keypair + epoch bound + randomness into the OAuth
//!   request
//! - Compact JWT decoding (no signature verification)
//! - Salt service and proving service HTTP clients
//! - Deterministic two-stage address derivation
//! - Session lifecycle: authenticate, validity, refresh, revoke
//!
//! JWT signature checking and proof verification stay on chain; the salt
//! and proving services are external HTTP collaborators. Key persistence
//! is the caller's concern via the pluggable session store.

mod address;
mod base64url;
mod error;
mod flow;
mod jwt;
mod keypair;
mod manager;
mod nonce;
mod provider;
mod services;
mod session;
mod store;

pub use address::{derive_address, AddressComponents, DEFAULT_KEY_CLAIM, ZKLOGIN_ADDRESS_FLAG};
pub use error::{ErrorKind, Result, ZkLoginError};
pub use flow::{FlowConfig, OAuthFlow};
pub use jwt::{Audience, Jwt, JwtClaims, JwtHeader};
pub use keypair::{EphemeralKeyPair, MAX_SESSION_EPOCHS, SESSION_DURATION_SECS};
pub use manager::{AuthenticatedSession, ZkLoginSessionManager};
pub use nonce::{bind_nonce, generate_randomness, NONCE_LENGTH, RANDOMNESS_LENGTH};
pub use provider::{Network, OAuthProvider, ProviderConfig};
pub use services::ZkLoginServices;
pub use session::{AuthStage, ZkLoginSession, ZkProof};
pub use store::{MemorySessionStore, SessionStore};
