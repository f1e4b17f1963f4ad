//! Thin clients for the two external collaborators: the salt service and
//! the zero-knowledge proving service.
//!
//! Both calls are single-shot with no local caching or retry. A non-2xx
//! response surfaces the status and body so the caller can decide whether
//! retrying makes sense; blindly repeating is not guaranteed safe against
//! arbitrary deployments.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::DEFAULT_KEY_CLAIM;
use crate::base64url;
use crate::error::{Result, ZkLoginError};
use crate::jwt::Jwt;
use crate::session::{ZkLoginSession, ZkProof};

const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaltRequest<'a> {
    issuer: &'a str,
    client_id: &'a str,
    subject_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SaltResponse {
    salt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProveRequest<'a> {
    jwt: &'a str,
    user_salt: &'a str,
    ephemeral_public_key: String,
    jwt_randomness: String,
    max_epoch: u64,
    key_claim_name: &'a str,
    key_claim_value: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProveResponse {
    proof: Value,
    public_input_hash: String,
}

/// HTTP clients for salt issuance and proof generation.
#[derive(Clone)]
pub struct ZkLoginServices {
    http: Client,
}

impl ZkLoginServices {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Ask the salt service for the user's salt.
    ///
    /// The identity fields come from the token; the client id is the one
    /// this controller is configured with, not whatever the token carries.
    pub async fn request_user_salt(
        &self,
        service_url: &str,
        jwt: &Jwt,
        client_id: &str,
    ) -> Result<String> {
        let body = SaltRequest {
            issuer: &jwt.claims.iss,
            client_id,
            subject_id: &jwt.claims.sub,
        };

        let response = self
            .http
            .post(format!("{}/salt", service_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ZkLoginError::SaltService {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let salt_response: SaltResponse = response.json().await?;
        tracing::debug!(issuer = %jwt.claims.iss, "salt issued");
        Ok(salt_response.salt)
    }

    /// Ask the proving service for a proof binding `jwt` to the session's
    /// ephemeral key.
    pub async fn request_zk_proof(
        &self,
        service_url: &str,
        jwt: &Jwt,
        user_salt: &str,
        session: &ZkLoginSession,
    ) -> Result<ZkProof> {
        let ephemeral_public_key = session.key_pair.public_key_base64();
        let body = ProveRequest {
            jwt: &jwt.raw,
            user_salt,
            ephemeral_public_key: ephemeral_public_key.clone(),
            jwt_randomness: base64url::encode(&session.jwt_randomness),
            max_epoch: session.key_pair.max_epoch,
            key_claim_name: DEFAULT_KEY_CLAIM,
            key_claim_value: &jwt.claims.sub,
        };

        let response = self
            .http
            .post(format!("{}/prove", service_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ZkLoginError::ProvingService {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let prove_response: ProveResponse = response.json().await?;
        tracing::debug!(max_epoch = session.key_pair.max_epoch, "proof issued");
        Ok(ZkProof {
            proof: prove_response.proof,
            public_input_hash: prove_response.public_input_hash,
            issuer: jwt.claims.iss.clone(),
            max_epoch: session.key_pair.max_epoch,
            ephemeral_public_key,
        })
    }
}

impl Default for ZkLoginServices {
    fn default() -> Self {
        Self::new()
    }
}
