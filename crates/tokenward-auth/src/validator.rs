//! Introspection-based bearer token validation
//!
//! [`IntrospectionValidator`] runs the whole flow for one inbound request:
//!
//! 1. Parse the `Authorization` header (no network call when it is absent or malformed)
//! 2. Resolve the introspection endpoint from the issuer's discovery document
//! 3. POST the token to the introspection endpoint with client credentials
//! 4. Accept the token only when the response says `"active": true`
//!
//! Every failure collapses to "no identity" at the boundary. The underlying
//! [`AuthError`] is logged with a stable `kind` field so operators can tell a
//! dead Authorization Server from a revoked token.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ClientCredentials, IntrospectionConfig};
use crate::discovery::MetadataResolver;
use crate::error::{AuthError, AuthResult};
use crate::header::parse_bearer;
use crate::introspection::{IntrospectionClient, IntrospectionResponse};

/// The identity proven by an active introspection response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// The `sub` claim; the Authorization Server may omit it
    pub subject: Option<String>,
    /// Space-separated scopes granted to the token
    pub scope: Option<String>,
    /// Client the token was issued to
    pub client_id: Option<String>,
    /// Expiry as seconds since the Unix epoch
    pub expires_at: Option<u64>,
}

impl AuthenticatedIdentity {
    /// The subject, if present
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Iterate the granted scopes
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }
}

impl From<IntrospectionResponse> for AuthenticatedIdentity {
    fn from(response: IntrospectionResponse) -> Self {
        Self {
            subject: response.sub,
            scope: response.scope,
            client_id: response.client_id,
            expires_at: response.exp,
        }
    }
}

/// Anything that can turn an `Authorization` header into an identity
///
/// The middleware is written against this trait so it can be driven by a
/// stub in tests or by an alternative validation strategy.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate a raw `Authorization` header value
    ///
    /// Returns `None` for every kind of failure.
    async fn validate_authorization(&self, authorization: Option<&str>)
    -> Option<AuthenticatedIdentity>;
}

/// Validates bearer tokens against a remote introspection endpoint
///
/// Explicitly constructed and shared by reference (typically behind an `Arc`);
/// all state is read-only apart from the optional caches.
#[derive(Clone)]
pub struct IntrospectionValidator {
    credentials: Arc<ClientCredentials>,
    resolver: MetadataResolver,
    client: IntrospectionClient,
    cache: Option<Arc<IntrospectionCache>>,
}

impl fmt::Debug for IntrospectionValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrospectionValidator")
            .field("credentials", &self.credentials)
            .field("flavor", &self.resolver.flavor())
            .field("introspection_cache", &self.cache.is_some())
            .finish()
    }
}

impl IntrospectionValidator {
    /// Create a validator with its own pooled HTTP client
    ///
    /// The client applies the configured timeout to every call and does not
    /// follow redirects.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the credentials are incomplete,
    /// the timeout is zero, or the HTTP client cannot be built.
    pub fn new(credentials: ClientCredentials, config: &IntrospectionConfig) -> AuthResult<Self> {
        if config.request_timeout().is_zero() {
            return Err(AuthError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Self::with_http_client(credentials, config, http_client)
    }

    /// Create a validator around an existing HTTP client
    ///
    /// The caller is responsible for the client's timeout and redirect policy.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the credentials are incomplete.
    pub fn with_http_client(
        credentials: ClientCredentials,
        config: &IntrospectionConfig,
        http_client: reqwest::Client,
    ) -> AuthResult<Self> {
        credentials.validate()?;
        let credentials = Arc::new(credentials);

        let mut resolver = MetadataResolver::new(
            http_client.clone(),
            config.discovery,
            config.max_response_bytes,
        );
        if let Some(ttl) = config.metadata_cache_ttl() {
            resolver = resolver.with_cache(ttl);
        }

        let client = IntrospectionClient::new(
            http_client,
            Arc::clone(&credentials),
            config.max_response_bytes,
        );

        Ok(Self {
            credentials,
            resolver,
            client,
            cache: config
                .introspection_cache_ttl()
                .map(|ttl| Arc::new(IntrospectionCache::new(ttl))),
        })
    }

    /// The relying party credentials
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Validate and report the precise failure
    ///
    /// # Errors
    ///
    /// Any [`AuthError`] except `Configuration` and `Cancelled`:
    /// `MissingCredentials`/`MalformedHeader` without touching the network,
    /// `Network`/`Parse` from discovery or introspection, `EndpointRejected`
    /// for a non-2xx introspection status, `InactiveToken` otherwise.
    pub async fn try_validate(&self, authorization: Option<&str>) -> AuthResult<AuthenticatedIdentity> {
        let token = parse_bearer(authorization)?;

        let cache_key = self.cache.as_ref().map(|_| token_digest(token.as_str()));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key)
            && let Some(identity) = cache.get(key)
        {
            debug!("Using cached introspection result");
            return Ok(identity);
        }

        let metadata = self.resolver.resolve(&self.credentials.issuer).await?;
        let response = self
            .client
            .introspect(metadata.introspection_endpoint(), token.as_str())
            .await?;

        if !response.is_active() {
            return Err(AuthError::InactiveToken);
        }

        let identity = AuthenticatedIdentity::from(response);
        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.insert(key, &identity);
        }
        Ok(identity)
    }

    /// Validate a raw `Authorization` header value
    ///
    /// Returns the identity for an active token and `None` otherwise. Failures
    /// are logged, never returned.
    pub async fn validate_authorization(
        &self,
        authorization: Option<&str>,
    ) -> Option<AuthenticatedIdentity> {
        match self.try_validate(authorization).await {
            Ok(identity) => {
                debug!(subject = ?identity.subject, "Bearer token accepted");
                Some(identity)
            }
            Err(err) => {
                log_rejection(&err);
                None
            }
        }
    }

    /// Like [`validate_authorization`](Self::validate_authorization), but gives
    /// up as soon as `cancel` fires
    ///
    /// Dropping the in-flight future aborts both outbound HTTP calls.
    pub async fn validate_authorization_with_cancellation(
        &self,
        authorization: Option<&str>,
        cancel: &CancellationToken,
    ) -> Option<AuthenticatedIdentity> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log_rejection(&AuthError::Cancelled);
                None
            }
            identity = self.validate_authorization(authorization) => identity,
        }
    }
}

#[async_trait]
impl TokenValidator for IntrospectionValidator {
    async fn validate_authorization(
        &self,
        authorization: Option<&str>,
    ) -> Option<AuthenticatedIdentity> {
        IntrospectionValidator::validate_authorization(self, authorization).await
    }
}

fn log_rejection(err: &AuthError) {
    if err.is_infrastructure() {
        warn!(kind = %err.kind(), error = %err, "Bearer token validation failed");
    } else {
        debug!(kind = %err.kind(), error = %err, "Bearer token rejected");
    }
}

// Hex SHA-256 of the token; raw tokens never become map keys
fn token_digest(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Short-lived cache of active introspection results
#[derive(Debug)]
struct IntrospectionCache {
    ttl: Duration,
    entries: DashMap<String, CachedIdentity>,
}

#[derive(Debug, Clone)]
struct CachedIdentity {
    identity: AuthenticatedIdentity,
    expires_at: Instant,
}

impl IntrospectionCache {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    fn get(&self, key: &str) -> Option<AuthenticatedIdentity> {
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Some(entry.identity.clone());
            }
            drop(entry); // Release the shard lock before removing
            self.entries.remove(key);
        }
        None
    }

    fn insert(&self, key: String, identity: &AuthenticatedIdentity) {
        // Never outlive the token itself
        let ttl = match identity.expires_at.map(remaining_lifetime) {
            Some(remaining) => self.ttl.min(remaining),
            None => self.ttl,
        };
        if ttl.is_zero() {
            return;
        }

        self.prune_expired();
        self.entries.insert(
            key,
            CachedIdentity {
                identity: identity.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn prune_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| now < entry.expires_at);
    }
}

fn remaining_lifetime(exp: u64) -> Duration {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    Duration::from_secs(exp.saturating_sub(now))
}
