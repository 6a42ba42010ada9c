//! # Metadata Resolver
//!
//! Fetches the Authorization Server's discovery document and extracts the
//! introspection endpoint. One GET per call unless the optional per-issuer
//! cache is enabled; failures propagate unchanged, with no retry and no
//! fallback to the other well-known path.

use super::types::{DiscoveryDocument, DiscoveryFlavor, ServerMetadata};
use crate::error::{AuthError, AuthResult};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Cache entry for resolved metadata
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The resolved metadata
    metadata: ServerMetadata,

    /// When this entry expires
    expires_at: Instant,
}

/// Resolves [`ServerMetadata`] for an issuer
///
/// Cloning is cheap: the HTTP client and cache are shared.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    /// HTTP client (connection pooled, timeout applied)
    client: reqwest::Client,

    /// Which well-known document to fetch
    flavor: DiscoveryFlavor,

    /// Maximum accepted body size
    max_response_bytes: usize,

    /// Per-issuer cache, present only when a TTL is configured
    cache: Option<Arc<MetadataCache>>,
}

#[derive(Debug)]
struct MetadataCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl MetadataResolver {
    /// Create a resolver without caching
    pub fn new(client: reqwest::Client, flavor: DiscoveryFlavor, max_response_bytes: usize) -> Self {
        Self {
            client,
            flavor,
            max_response_bytes,
            cache: None,
        }
    }

    /// Enable per-issuer caching of resolved metadata
    #[must_use]
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(Arc::new(MetadataCache {
            ttl,
            entries: DashMap::new(),
        }));
        self
    }

    /// The configured discovery flavor
    pub fn flavor(&self) -> DiscoveryFlavor {
        self.flavor
    }

    /// Resolve the Authorization Server metadata for `issuer`
    ///
    /// # Errors
    ///
    /// - [`AuthError::Network`] on connection failure, timeout or a non-2xx status
    /// - [`AuthError::Parse`] if the body is not a JSON object, is too large, or
    ///   lacks a valid `introspection_endpoint`
    pub async fn resolve(&self, issuer: &Url) -> AuthResult<ServerMetadata> {
        if let Some(cached) = self.get_cached(issuer) {
            debug!("Returning cached metadata for: {}", issuer);
            return Ok(cached);
        }

        let discovery_url = self.flavor.discovery_url(issuer)?;
        debug!("Fetching discovery document: {}", discovery_url);

        let response = self
            .client
            .get(discovery_url.clone())
            .header(http::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest("discovery request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Network(format!(
                "discovery endpoint {} returned HTTP {} {}",
                discovery_url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(content_length) = response.content_length()
            && content_length > self.max_response_bytes as u64
        {
            return Err(AuthError::Parse(
                "discovery document exceeds size limit".to_string(),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::from_reqwest("failed to read discovery document", e))?;

        if body.len() > self.max_response_bytes {
            return Err(AuthError::Parse(
                "discovery document exceeds size limit".to_string(),
            ));
        }

        let document: DiscoveryDocument = serde_json::from_slice(&body)
            .map_err(|e| AuthError::Parse(format!("invalid discovery document: {e}")))?;

        let metadata = ServerMetadata::try_from(document)?;
        debug!(
            "Resolved introspection endpoint for {}: {}",
            issuer,
            metadata.introspection_endpoint()
        );

        self.cache_metadata(issuer, &metadata);
        Ok(metadata)
    }

    /// Get cached metadata if still fresh
    fn get_cached(&self, issuer: &Url) -> Option<ServerMetadata> {
        let cache = self.cache.as_ref()?;
        let key = issuer.as_str();

        if let Some(entry) = cache.entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Some(entry.metadata.clone());
            }
            drop(entry); // Release the shard lock before removing
            cache.entries.remove(key);
        }
        None
    }

    fn cache_metadata(&self, issuer: &Url, metadata: &ServerMetadata) {
        if let Some(cache) = &self.cache {
            let now = Instant::now();
            cache.entries.retain(|_, entry| now < entry.expires_at);
            cache.entries.insert(
                issuer.as_str().to_string(),
                CacheEntry {
                    metadata: metadata.clone(),
                    expires_at: now + cache.ttl,
                },
            );
        }
    }

    /// Drop every cached entry
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.entries.clear();
        }
    }
}
