use thiserror::Error;

use crate::provider::{Network, OAuthProvider};

pub type Result<T> = std::result::Result<T, ZkLoginError>;

#[derive(Debug, Error)]
pub enum ZkLoginError {
    #[error("Unknown OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Provider {provider} is not enabled on {network}")]
    UnsupportedNetwork {
        provider: OAuthProvider,
        network: Network,
    },

    #[error("Provider {0} has no authorization endpoint configured")]
    MissingAuthorizationEndpoint(OAuthProvider),

    #[error("Invalid callback URL: {0}")]
    InvalidCallbackUrl(String),

    #[error("Callback is missing the {missing} parameter")]
    MissingCallbackParameter { missing: &'static str },

    #[error("Malformed JWT: {0}")]
    MalformedJwt(String),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session has no identity token attached")]
    SessionNotAuthenticated,

    #[error("Salt service returned {status}: {body}")]
    SaltService { status: u16, body: String },

    #[error("Proving service returned {status}: {body}")]
    ProvingService { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Random generation failed: {0}")]
    RngFailed(String),
}

/// Coarse classification for callers that map errors onto retry or
/// user-facing handling without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Misconfiguration caught before any network traffic.
    Configuration,
    /// The login attempt itself is broken (bad callback, bad token, bad state).
    Protocol,
    /// A remote dependency failed; retrying may succeed.
    ExternalService,
}

impl ZkLoginError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZkLoginError::UnknownProvider(_)
            | ZkLoginError::UnknownNetwork(_)
            | ZkLoginError::UnsupportedNetwork { .. }
            | ZkLoginError::MissingAuthorizationEndpoint(_) => ErrorKind::Configuration,

            ZkLoginError::InvalidCallbackUrl(_)
            | ZkLoginError::MissingCallbackParameter { .. }
            | ZkLoginError::MalformedJwt(_)
            | ZkLoginError::SessionNotFound
            | ZkLoginError::SessionNotAuthenticated
            | ZkLoginError::Signing(_)
            | ZkLoginError::RngFailed(_) => ErrorKind::Protocol,

            ZkLoginError::SaltService { .. }
            | ZkLoginError::ProvingService { .. }
            | ZkLoginError::Http(_)
            | ZkLoginError::Json(_) => ErrorKind::ExternalService,
        }
    }
}
