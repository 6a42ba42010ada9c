//! Configuration types for the introspection validator
//!
//! Values arrive already resolved; loading them from files or the environment
//! is the embedding application's job.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::discovery::DiscoveryFlavor;
use crate::error::{AuthError, AuthResult};

/// Relying-party credentials used to authenticate against the introspection endpoint
///
/// These identify *this service* to the Authorization Server. They are never the
/// end user's credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// Issuer base URL of the Authorization Server
    pub issuer: Url,
    /// Confidential client identifier
    pub client_id: String,
    /// Client secret (zeroized on drop)
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub client_secret: SecretString,
}

// Manual Debug impl to keep client_secret out of logs
impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("issuer", &self.issuer.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ClientCredentials {
    /// Build credentials, rejecting empty values and unparseable issuers
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the issuer is not an absolute URL or
    /// if the client id or secret is empty.
    pub fn new(
        issuer: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> AuthResult<Self> {
        let issuer = Url::parse(issuer)
            .map_err(|e| AuthError::Configuration(format!("invalid issuer URL: {e}")))?;

        let credentials = Self {
            issuer,
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Check that every required value is present
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] naming the first missing value.
    pub fn validate(&self) -> AuthResult<()> {
        if self.issuer.cannot_be_a_base() {
            return Err(AuthError::Configuration(
                "issuer must be a base URL".to_string(),
            ));
        }
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration("client_id is required".to_string()));
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(AuthError::Configuration(
                "client_secret is required".to_string(),
            ));
        }
        Ok(())
    }
}

// Custom serialization for SecretString
fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

// Custom deserialization for SecretString
fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(SecretString::new(s))
}

/// Tunables for discovery and introspection calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrospectionConfig {
    /// Which well-known discovery document to fetch
    pub discovery: DiscoveryFlavor,

    /// Timeout applied to each outbound call, in milliseconds
    pub request_timeout_ms: u64,

    /// Maximum accepted body size for discovery and introspection responses
    pub max_response_bytes: usize,

    /// User agent for outbound requests
    pub user_agent: String,

    /// Cache resolved metadata per issuer for this many seconds (disabled when unset)
    pub metadata_cache_ttl_secs: Option<u64>,

    /// Cache active introspection results for this many seconds (disabled when unset)
    pub introspection_cache_ttl_secs: Option<u64>,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryFlavor::default(),
            request_timeout_ms: 10_000,
            max_response_bytes: 64 * 1024, // 64 KiB
            user_agent: format!("tokenward/{}", env!("CARGO_PKG_VERSION")),
            metadata_cache_ttl_secs: None,
            introspection_cache_ttl_secs: None,
        }
    }
}

impl IntrospectionConfig {
    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Metadata cache TTL, if caching is enabled
    pub fn metadata_cache_ttl(&self) -> Option<Duration> {
        self.metadata_cache_ttl_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Introspection result cache TTL, if caching is enabled
    pub fn introspection_cache_ttl(&self) -> Option<Duration> {
        self.introspection_cache_ttl_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Set the discovery flavor
    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryFlavor) -> Self {
        self.discovery = discovery;
        self
    }

    /// Set the per-request timeout
    ///
    /// Millisecond precision; a zero timeout is rejected when the validator is built.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable the per-issuer metadata cache
    #[must_use]
    pub fn with_metadata_cache(mut self, ttl: Duration) -> Self {
        self.metadata_cache_ttl_secs = Some(ttl.as_secs());
        self
    }

    /// Enable the introspection result cache
    #[must_use]
    pub fn with_introspection_cache(mut self, ttl: Duration) -> Self {
        self.introspection_cache_ttl_secs = Some(ttl.as_secs());
        self
    }
}
