//! # Authorization Server Discovery Types
//!
//! Types for OAuth 2.0 Authorization Server Metadata (RFC 8414) and
//! OpenID Connect Discovery 1.0 documents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::error::{AuthError, AuthResult};

/// Which well-known document to fetch from the issuer
///
/// Both shapes carry `introspection_endpoint`; they differ only in which optional
/// fields are present, so either works for resolving the introspection endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryFlavor {
    /// RFC 8414: `/.well-known/oauth-authorization-server`
    #[default]
    #[serde(rename = "oauth_authorization_server")]
    OAuthAuthorizationServer,
    /// OpenID Connect Discovery 1.0: `/.well-known/openid-configuration`
    #[serde(rename = "openid_configuration")]
    OpenIdConfiguration,
}

impl DiscoveryFlavor {
    /// Well-known path for this flavor
    pub fn well_known_path(&self) -> &'static str {
        match self {
            DiscoveryFlavor::OAuthAuthorizationServer => "/.well-known/oauth-authorization-server",
            DiscoveryFlavor::OpenIdConfiguration => "/.well-known/openid-configuration",
        }
    }

    /// Discovery URL for an issuer: the issuer with any trailing slash removed,
    /// followed by the well-known path
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Parse`] if the joined string is not a valid URL.
    pub fn discovery_url(&self, issuer: &Url) -> AuthResult<Url> {
        let base = issuer.as_str().trim_end_matches('/');
        Url::parse(&format!("{}{}", base, self.well_known_path()))
            .map_err(|e| AuthError::Parse(format!("invalid discovery URL: {e}")))
    }
}

/// Raw discovery document as published by the Authorization Server
///
/// Only the fields this crate acts on are typed; everything else is kept in
/// `additional` for callers that want it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryDocument {
    /// The authorization server's issuer identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// URL of the token introspection endpoint (RFC 7662)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint: Option<String>,

    /// Client authentication methods accepted at the introspection endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint_auth_methods_supported: Option<Vec<String>>,

    /// Any other metadata
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

/// Resolved Authorization Server metadata
///
/// Immutable once constructed; always carries a usable introspection endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMetadata {
    issuer: Option<String>,
    introspection_endpoint: Url,
}

impl ServerMetadata {
    /// Build metadata directly from a known endpoint
    pub fn new(introspection_endpoint: Url) -> Self {
        Self {
            issuer: None,
            introspection_endpoint,
        }
    }

    /// Issuer identifier advertised by the document, if any
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// The introspection endpoint URL
    pub fn introspection_endpoint(&self) -> &Url {
        &self.introspection_endpoint
    }
}

impl TryFrom<DiscoveryDocument> for ServerMetadata {
    type Error = AuthError;

    fn try_from(document: DiscoveryDocument) -> AuthResult<Self> {
        let endpoint = document
            .introspection_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AuthError::Parse("discovery document has no introspection_endpoint".to_string())
            })?;

        let introspection_endpoint = Url::parse(endpoint).map_err(|e| {
            AuthError::Parse(format!("introspection_endpoint is not a valid URL: {e}"))
        })?;

        if !matches!(introspection_endpoint.scheme(), "http" | "https") {
            return Err(AuthError::Parse(format!(
                "introspection_endpoint has unsupported scheme '{}'",
                introspection_endpoint.scheme()
            )));
        }

        Ok(Self {
            issuer: document.issuer,
            introspection_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_urls() {
        let issuer = Url::parse("https://login.example.com/uas").unwrap();

        assert_eq!(
            DiscoveryFlavor::OAuthAuthorizationServer
                .discovery_url(&issuer)
                .unwrap()
                .as_str(),
            "https://login.example.com/uas/.well-known/oauth-authorization-server"
        );
        assert_eq!(
            DiscoveryFlavor::OpenIdConfiguration
                .discovery_url(&issuer)
                .unwrap()
                .as_str(),
            "https://login.example.com/uas/.well-known/openid-configuration"
        );
    }

    #[test]
    fn test_discovery_url_trailing_slash() {
        let issuer = Url::parse("https://example.com/").unwrap();
        let url = DiscoveryFlavor::OAuthAuthorizationServer
            .discovery_url(&issuer)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/.well-known/oauth-authorization-server"
        );
    }

    #[test]
    fn test_metadata_from_oauth2_document() {
        let json = r#"{
            "issuer": "https://server.example.com",
            "authorization_endpoint": "https://server.example.com/authorize",
            "token_endpoint": "https://server.example.com/token",
            "introspection_endpoint": "https://server.example.com/introspect",
            "response_types_supported": ["code"]
        }"#;
        let document: DiscoveryDocument = serde_json::from_str(json).unwrap();
        assert!(document.additional.contains_key("token_endpoint"));

        let metadata = ServerMetadata::try_from(document).unwrap();
        assert_eq!(metadata.issuer(), Some("https://server.example.com"));
        assert_eq!(
            metadata.introspection_endpoint().as_str(),
            "https://server.example.com/introspect"
        );
    }

    #[test]
    fn test_metadata_missing_endpoint() {
        let document: DiscoveryDocument =
            serde_json::from_str(r#"{"issuer": "https://server.example.com"}"#).unwrap();
        let err = ServerMetadata::try_from(document).unwrap_err();
        assert!(matches!(err, AuthError::Parse(_)));
    }

    #[test]
    fn test_metadata_blank_endpoint() {
        let document = DiscoveryDocument {
            introspection_endpoint: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ServerMetadata::try_from(document),
            Err(AuthError::Parse(_))
        ));
    }

    #[test]
    fn test_metadata_relative_endpoint() {
        let document = DiscoveryDocument {
            introspection_endpoint: Some("/introspect".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ServerMetadata::try_from(document),
            Err(AuthError::Parse(_))
        ));
    }

    #[test]
    fn test_flavor_serde_names() {
        let flavor: DiscoveryFlavor = serde_json::from_str(r#""openid_configuration""#).unwrap();
        assert_eq!(flavor, DiscoveryFlavor::OpenIdConfiguration);
        assert_eq!(
            serde_json::to_string(&DiscoveryFlavor::OAuthAuthorizationServer).unwrap(),
            r#""oauth_authorization_server""#
        );
    }
}
