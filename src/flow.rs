//! OAuth authorization flow: builds the redirect URL that starts a login
//! and consumes the provider callback that finishes it.
//!
//! The flow uses `response_type=id_token` (implicit flow); there is no code
//! exchange. The session id rides along as the OAuth `state` parameter and
//! is how the callback finds its way back to the right session.

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::error::{Result, ZkLoginError};
use crate::jwt::Jwt;
use crate::keypair::EphemeralKeyPair;
use crate::nonce::{bind_nonce, generate_randomness};
use crate::provider::{Network, OAuthProvider, ProviderConfig};
use crate::session::ZkLoginSession;
use crate::store::SessionStore;

/// Per-controller client configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub client_id: String,
    pub redirect_uri: String,
    /// Reserved for providers that require one; the id_token flow itself
    /// never sends it.
    pub client_secret: Option<String>,
}

/// One (provider, network) login front end over a shared session store.
pub struct OAuthFlow {
    provider: OAuthProvider,
    network: Network,
    config: FlowConfig,
    store: Arc<dyn SessionStore>,
}

impl OAuthFlow {
    /// Fails with `UnsupportedNetwork` when the provider is not whitelisted
    /// on `network`; nothing else is validated here.
    pub fn new(
        provider: OAuthProvider,
        network: Network,
        config: FlowConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        if !provider.supports(network) {
            return Err(ZkLoginError::UnsupportedNetwork { provider, network });
        }
        Ok(OAuthFlow {
            provider,
            network,
            config,
            store,
        })
    }

    pub fn provider(&self) -> OAuthProvider {
        self.provider
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    /// Mint a session with a fresh ephemeral keypair and return the
    /// provider redirect URL carrying the bound nonce.
    pub fn generate_authorization_url(&self, current_epoch: u64) -> Result<String> {
        let now = Utc::now();
        let key_pair = EphemeralKeyPair::generate(now, current_epoch);
        let randomness = generate_randomness()?;
        let nonce = bind_nonce(key_pair.public_key(), key_pair.max_epoch, &randomness);

        let session = ZkLoginSession::new(
            self.provider,
            self.network,
            key_pair,
            randomness.to_vec(),
            nonce.clone(),
            now,
        );
        let state = session.id.clone();

        let url = build_authorization_url(
            self.provider,
            self.provider.config(),
            &self.config,
            &nonce,
            &state,
        )?;

        tracing::debug!(
            session_id = %state,
            provider = %self.provider,
            network = %self.network,
            "login session created"
        );
        self.store.put(session);
        Ok(url)
    }

    /// Consume the provider callback: find the session named by `state`,
    /// decode the returned token, and attach it.
    pub fn handle_callback(&self, callback_url: &str) -> Result<ZkLoginSession> {
        let (id_token, state) = extract_callback_params(callback_url)?;
        let mut session = self
            .store
            .get(&state)
            .ok_or(ZkLoginError::SessionNotFound)?;

        let jwt = Jwt::parse(&id_token)?;
        session.jwt = Some(jwt);
        self.store.put(session.clone());

        tracing::debug!(session_id = %state, "identity token attached");
        Ok(session)
    }
}

fn build_authorization_url(
    provider: OAuthProvider,
    provider_config: &ProviderConfig,
    config: &FlowConfig,
    nonce: &str,
    state: &str,
) -> Result<String> {
    let endpoint = provider_config
        .authorization_endpoint
        .ok_or(ZkLoginError::MissingAuthorizationEndpoint(provider))?;
    let scope = provider_config.scopes.join(" ");

    Ok(format!(
        "{}?client_id={}&response_type=id_token&scope={}&redirect_uri={}&nonce={}&state={}",
        endpoint,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&scope),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(nonce),
        urlencoding::encode(state),
    ))
}

/// Pull `id_token` and `state` out of a callback URL.
///
/// Providers answering with `response_type=id_token` put the parameters in
/// the fragment rather than the query, so both are scanned; query entries
/// win when a name appears in both.
fn extract_callback_params(callback_url: &str) -> Result<(String, String)> {
    let parsed =
        Url::parse(callback_url).map_err(|e| ZkLoginError::InvalidCallbackUrl(e.to_string()))?;

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if let Some(fragment) = parsed.fragment() {
        pairs.extend(
            url::form_urlencoded::parse(fragment.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    let lookup = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let id_token = lookup("id_token").ok_or(ZkLoginError::MissingCallbackParameter {
        missing: "id_token",
    })?;
    let state =
        lookup("state").ok_or(ZkLoginError::MissingCallbackParameter { missing: "state" })?;
    Ok((id_token, state))
}
