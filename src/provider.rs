//! OpenID providers and the networks each one is enabled on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ZkLoginError;

/// Target chain network. Provider availability differs per network because
/// each provider must be whitelisted in the chain's verifier before tokens
/// it issues can be proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Devnet,
    Testnet,
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ZkLoginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ZkLoginError::UnknownNetwork(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
    Twitch,
    Microsoft,
}

/// Static OIDC metadata for one provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderConfig {
    pub issuer: &'static str,
    /// Absent for providers that only issue tokens out of band.
    pub authorization_endpoint: Option<&'static str>,
    pub token_endpoint: &'static str,
    pub jwks_endpoint: &'static str,
    pub scopes: &'static [&'static str],
    pub supported_networks: &'static [Network],
}

const GOOGLE: ProviderConfig = ProviderConfig {
    issuer: "https://accounts.google.com",
    authorization_endpoint: Some("https://accounts.google.com/o/oauth2/v2/auth"),
    token_endpoint: "https://oauth2.googleapis.com/token",
    jwks_endpoint: "https://www.googleapis.com/oauth2/v3/certs",
    scopes: &["openid", "email"],
    supported_networks: &[Network::Devnet, Network::Testnet, Network::Mainnet],
};

const FACEBOOK: ProviderConfig = ProviderConfig {
    issuer: "https://www.facebook.com",
    authorization_endpoint: Some("https://www.facebook.com/v17.0/dialog/oauth"),
    token_endpoint: "https://graph.facebook.com/v17.0/oauth/access_token",
    jwks_endpoint: "https://www.facebook.com/.well-known/oauth/openid/jwks/",
    scopes: &["openid"],
    supported_networks: &[Network::Devnet, Network::Testnet, Network::Mainnet],
};

const TWITCH: ProviderConfig = ProviderConfig {
    issuer: "https://id.twitch.tv/oauth2",
    authorization_endpoint: Some("https://id.twitch.tv/oauth2/authorize"),
    token_endpoint: "https://id.twitch.tv/oauth2/token",
    jwks_endpoint: "https://id.twitch.tv/oauth2/keys",
    scopes: &["openid"],
    supported_networks: &[Network::Devnet, Network::Testnet, Network::Mainnet],
};

// Not yet whitelisted in the mainnet verifier.
const MICROSOFT: ProviderConfig = ProviderConfig {
    issuer: "https://login.microsoftonline.com/common/v2.0",
    authorization_endpoint: Some("https://login.microsoftonline.com/common/oauth2/v2.0/authorize"),
    token_endpoint: "https://login.microsoftonline.com/common/oauth2/v2.0/token",
    jwks_endpoint: "https://login.microsoftonline.com/common/discovery/v2.0/keys",
    scopes: &["openid", "email"],
    supported_networks: &[Network::Devnet, Network::Testnet],
};

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 4] = [
        OAuthProvider::Google,
        OAuthProvider::Facebook,
        OAuthProvider::Twitch,
        OAuthProvider::Microsoft,
    ];

    pub fn config(&self) -> &'static ProviderConfig {
        match self {
            OAuthProvider::Google => &GOOGLE,
            OAuthProvider::Facebook => &FACEBOOK,
            OAuthProvider::Twitch => &TWITCH,
            OAuthProvider::Microsoft => &MICROSOFT,
        }
    }

    pub fn supports(&self, network: Network) -> bool {
        self.config().supported_networks.contains(&network)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
            OAuthProvider::Twitch => "twitch",
            OAuthProvider::Microsoft => "microsoft",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = ZkLoginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "facebook" => Ok(OAuthProvider::Facebook),
            "twitch" => Ok(OAuthProvider::Twitch),
            "microsoft" => Ok(OAuthProvider::Microsoft),
            other => Err(ZkLoginError::UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_provider_has_an_issuer_and_openid_scope() {
        for provider in OAuthProvider::ALL {
            let config = provider.config();
            assert!(config.issuer.starts_with("https://"));
            assert!(config.scopes.contains(&"openid"));
            assert!(!config.supported_networks.is_empty());
        }
    }

    #[test]
    fn microsoft_is_not_on_mainnet() {
        assert!(!OAuthProvider::Microsoft.supports(Network::Mainnet));
        assert!(OAuthProvider::Microsoft.supports(Network::Testnet));
        assert!(OAuthProvider::Google.supports(Network::Mainnet));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Google".parse::<OAuthProvider>().unwrap(), OAuthProvider::Google);
        assert_eq!("TESTNET".parse::<Network>().unwrap(), Network::Testnet);
        assert!("github".parse::<OAuthProvider>().is_err());
        assert!("localnet".parse::<Network>().is_err());
    }

    #[test]
    fn serde_round_trip_uses_lowercase() {
        let json = serde_json::to_string(&OAuthProvider::Twitch).unwrap();
        assert_eq!(json, "\"twitch\"");
        let network: Network = serde_json::from_str("\"devnet\"").unwrap();
        assert_eq!(network, Network::Devnet);
    }
}
