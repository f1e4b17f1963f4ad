//! Session lifecycle manager: the top-level orchestrator that owns the
//! session store and drives a login from callback to derived address.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::address::{derive_address, AddressComponents};
use crate::error::{Result, ZkLoginError};
use crate::flow::{FlowConfig, OAuthFlow};
use crate::provider::{Network, OAuthProvider};
use crate::services::ZkLoginServices;
use crate::session::ZkLoginSession;
use crate::store::{MemorySessionStore, SessionStore};

/// Outcome of a completed `authenticate` call.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub address: String,
    pub session: ZkLoginSession,
}

/// One manager per (provider, network) pair. Sessions live in the injected
/// store; expiry is checked lazily on the validity calls, there is no
/// background sweeper.
///
/// Concurrent calls for different session ids are independent. Two
/// concurrent `authenticate` calls for the same id are not defined to be
/// safe; the caller must serialize per login attempt.
pub struct ZkLoginSessionManager {
    flow: OAuthFlow,
    store: Arc<dyn SessionStore>,
    services: ZkLoginServices,
    /// Latest chain epoch this process has observed.
    epoch_estimate: AtomicU64,
}

impl ZkLoginSessionManager {
    /// Build a manager backed by the in-memory store.
    pub fn new(
        provider: OAuthProvider,
        network: Network,
        config: FlowConfig,
        initial_epoch: u64,
    ) -> Result<Self> {
        Self::with_store(
            provider,
            network,
            config,
            initial_epoch,
            Arc::new(MemorySessionStore::new()),
        )
    }

    /// Build a manager over a caller-provided store.
    pub fn with_store(
        provider: OAuthProvider,
        network: Network,
        config: FlowConfig,
        initial_epoch: u64,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let flow = OAuthFlow::new(provider, network, config, Arc::clone(&store))?;
        Ok(ZkLoginSessionManager {
            flow,
            store,
            services: ZkLoginServices::new(),
            epoch_estimate: AtomicU64::new(initial_epoch),
        })
    }

    pub fn epoch_estimate(&self) -> u64 {
        self.epoch_estimate.load(Ordering::Relaxed)
    }

    /// Advance the chain epoch estimate. Stale lower values are ignored.
    pub fn update_epoch_estimate(&self, epoch: u64) {
        self.epoch_estimate.fetch_max(epoch, Ordering::Relaxed);
    }

    /// Start a login: mints a pending session and returns the provider
    /// redirect URL.
    pub fn generate_authorization_url(&self) -> Result<String> {
        self.flow.generate_authorization_url(self.epoch_estimate())
    }

    /// Drive a callback through salt issuance, proof generation, and
    /// address derivation.
    ///
    /// Each intermediate result is written to the store before the next
    /// step runs. A failing step surfaces that step's error and leaves the
    /// session in its last good state, queryable for diagnostics or retry.
    pub async fn authenticate(
        &self,
        callback_url: &str,
        salt_service_url: &str,
        proving_service_url: &str,
    ) -> Result<AuthenticatedSession> {
        let mut session = self.flow.handle_callback(callback_url)?;
        let jwt = session
            .jwt
            .clone()
            .ok_or(ZkLoginError::SessionNotAuthenticated)?;

        let user_salt = self
            .services
            .request_user_salt(salt_service_url, &jwt, self.flow.client_id())
            .await?;
        session.user_salt = Some(user_salt.clone());
        self.store.put(session.clone());

        let proof = self
            .services
            .request_zk_proof(proving_service_url, &jwt, &user_salt, &session)
            .await?;
        session.proof = Some(proof);
        self.store.put(session.clone());

        let components = AddressComponents::from_jwt(&jwt, &user_salt)?;
        let address = derive_address(&components);
        session.attach_address(address.clone())?;
        self.store.put(session.clone());

        tracing::info!(
            session_id = %session.id,
            provider = %self.flow.provider(),
            "authentication complete"
        );
        Ok(AuthenticatedSession { address, session })
    }

    /// Fails closed: a missing, clock-expired, or epoch-expired session is
    /// invalid, and expired sessions are purged on the spot.
    pub fn is_session_valid(&self, id: &str) -> bool {
        let Some(session) = self.store.get(id) else {
            return false;
        };
        let now = Utc::now();
        if session.is_expired(now) || session.key_pair.is_epoch_expired(self.epoch_estimate()) {
            tracing::debug!(session_id = %id, "session expired, purged");
            self.store.remove(id);
            return false;
        }
        true
    }

    /// Rotate the session's ephemeral keypair and extend its expiry.
    ///
    /// Cheap and local: no external calls. The old proof is discarded since
    /// it is bound to the replaced key; the caller re-requests one next time
    /// it needs to sign.
    pub fn refresh_session(&self, id: &str) -> Result<ZkLoginSession> {
        let mut session = self.store.get(id).ok_or(ZkLoginError::SessionNotFound)?;
        session.refresh(Utc::now(), self.epoch_estimate())?;
        self.store.put(session.clone());
        tracing::debug!(session_id = %id, "session refreshed");
        Ok(session)
    }

    pub fn get_session(&self, id: &str) -> Option<ZkLoginSession> {
        self.store.get(id)
    }

    /// Sessions whose wall-clock expiry has not passed. Epoch validity is
    /// deliberately not consulted here; use [`is_session_valid`] for the
    /// full check.
    ///
    /// [`is_session_valid`]: ZkLoginSessionManager::is_session_valid
    pub fn active_sessions(&self) -> Vec<ZkLoginSession> {
        let now = Utc::now();
        self.store
            .all()
            .into_iter()
            .filter(|session| !session.is_expired(now))
            .collect()
    }

    /// Unconditional removal. Returns whether a session was present.
    pub fn revoke_session(&self, id: &str) -> bool {
        let removed = self.store.remove(id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "session revoked");
        }
        removed
    }
}
