//! Compact JWT decoding.
//!
//! Decodes, never verifies: signature checking is the chain verifier's
//! job. The raw compact form is kept alongside the decoded claims because
//! the proving service needs the token byte for byte.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::base64url;
use crate::error::{Result, ZkLoginError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// The `aud` claim, which RFC 7519 allows as a string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn first(&self) -> Option<&str> {
        match self {
            Audience::Single(aud) => Some(aud),
            Audience::Multiple(list) => list.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub iss: String,
    pub aud: Audience,
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Provider-specific claims we pass through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A decoded identity token plus the compact form it came from.
#[derive(Debug, Clone)]
pub struct Jwt {
    pub header: JwtHeader,
    pub claims: JwtClaims,
    pub signature: Vec<u8>,
    pub raw: String,
}

impl Jwt {
    /// Decode a compact `header.payload.signature` token.
    ///
    /// Requires `iss`, `aud`, and `sub` in the payload; everything else is
    /// optional or passed through via `extra`.
    pub fn parse(compact: &str) -> Result<Self> {
        let segments: Vec<&str> = compact.split('.').collect();
        if segments.len() != 3 {
            return Err(ZkLoginError::MalformedJwt(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        }

        let header_bytes = base64url::decode(segments[0])
            .map_err(|e| ZkLoginError::MalformedJwt(format!("header: {e}")))?;
        let header: JwtHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| ZkLoginError::MalformedJwt(format!("header: {e}")))?;

        let payload_bytes = base64url::decode(segments[1])
            .map_err(|e| ZkLoginError::MalformedJwt(format!("payload: {e}")))?;
        let claims: JwtClaims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| ZkLoginError::MalformedJwt(format!("payload: {e}")))?;

        let signature = base64url::decode(segments[2])
            .map_err(|e| ZkLoginError::MalformedJwt(format!("signature: {e}")))?;

        Ok(Jwt {
            header,
            claims,
            signature,
            raw: compact.to_string(),
        })
    }

    /// The client id the token was issued to.
    pub fn audience(&self) -> Option<&str> {
        self.claims.aud.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compact(header: &Value, claims: &Value) -> String {
        format!(
            "{}.{}.{}",
            base64url::encode(header.to_string().as_bytes()),
            base64url::encode(claims.to_string().as_bytes()),
            base64url::encode(b"signature-bytes"),
        )
    }

    fn standard_claims() -> Value {
        json!({
            "iss": "https://accounts.google.com",
            "aud": "client-123.apps.googleusercontent.com",
            "sub": "110169484474386276334",
            "nonce": "hTPpgF7XAKbW37rEUS6pEVZqmoI",
            "email": "user@example.com",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
        })
    }

    #[test]
    fn parses_standard_token() {
        let token = compact(
            &json!({"alg": "RS256", "kid": "abc123", "typ": "JWT"}),
            &standard_claims(),
        );
        let jwt = Jwt::parse(&token).unwrap();

        assert_eq!(jwt.header.alg, "RS256");
        assert_eq!(jwt.header.kid.as_deref(), Some("abc123"));
        assert_eq!(jwt.claims.iss, "https://accounts.google.com");
        assert_eq!(jwt.claims.sub, "110169484474386276334");
        assert_eq!(jwt.audience(), Some("client-123.apps.googleusercontent.com"));
        assert_eq!(jwt.claims.nonce.as_deref(), Some("hTPpgF7XAKbW37rEUS6pEVZqmoI"));
        assert_eq!(jwt.signature, b"signature-bytes");
        assert_eq!(jwt.raw, token);
    }

    #[test]
    fn audience_array_takes_first() {
        let mut claims = standard_claims();
        claims["aud"] = json!(["primary-client", "secondary-client"]);
        let jwt = Jwt::parse(&compact(&json!({"alg": "RS256"}), &claims)).unwrap();
        assert_eq!(jwt.audience(), Some("primary-client"));
    }

    #[test]
    fn provider_specific_claims_land_in_extra() {
        let mut claims = standard_claims();
        claims["picture"] = json!("https://example.com/avatar.png");
        let jwt = Jwt::parse(&compact(&json!({"alg": "RS256"}), &claims)).unwrap();
        assert_eq!(
            jwt.claims.extra.get("picture").and_then(Value::as_str),
            Some("https://example.com/avatar.png")
        );
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let err = Jwt::parse("only.two").unwrap_err();
        assert!(matches!(err, ZkLoginError::MalformedJwt(_)));
        assert!(matches!(
            Jwt::parse("not-a-jwt"),
            Err(ZkLoginError::MalformedJwt(_))
        ));
        assert!(Jwt::parse("a.b.c.d").is_err());
    }

    #[test]
    fn rejects_undecodable_payload() {
        let header = base64url::encode(br#"{"alg":"RS256"}"#);
        let token = format!("{header}.!!notbase64!!.{}", base64url::encode(b"sig"));
        assert!(matches!(
            Jwt::parse(&token),
            Err(ZkLoginError::MalformedJwt(_))
        ));
    }

    #[test]
    fn rejects_missing_subject() {
        let claims = json!({
            "iss": "https://accounts.google.com",
            "aud": "client-123",
        });
        let err = Jwt::parse(&compact(&json!({"alg": "RS256"}), &claims)).unwrap_err();
        assert!(matches!(err, ZkLoginError::MalformedJwt(msg) if msg.contains("payload")));
    }
}
