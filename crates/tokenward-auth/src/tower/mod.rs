//! # Tower Middleware Integration
//!
//! Tower Layer and Service implementations that put the introspection
//! validator in front of any HTTP service.
//!
//! ## Overview
//!
//! - [`IntrospectionLayer`] - A Tower Layer that wraps services with bearer token validation
//! - [`IntrospectionService`] - A Tower Service that validates the `Authorization` header
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//! use tokenward_auth::tower::{AuthLayerConfig, IntrospectionLayer};
//!
//! let layer = IntrospectionLayer::with_config(
//!     validator,
//!     AuthLayerConfig::default().challenge_scope("payments"),
//! );
//!
//! let service = ServiceBuilder::new()
//!     .layer(layer)
//!     .service(my_inner_service);
//! ```
//!
//! ## Request Extensions
//!
//! On successful validation, the [`AuthenticatedIdentity`](crate::AuthenticatedIdentity)
//! is inserted into the request's extensions:
//!
//! ```rust,ignore
//! if let Some(identity) = req.extensions().get::<AuthenticatedIdentity>() {
//!     println!("Authenticated subject: {:?}", identity.subject);
//! }
//! ```
//!
//! Failed validation never reaches the inner service. The caller gets a
//! `401 Unauthorized` with a `WWW-Authenticate` challenge instead.

mod layer;
mod service;

pub use layer::IntrospectionLayer;
pub use service::{IntrospectionService, IntrospectionServiceFuture};

/// Configuration for the introspection layer
#[derive(Debug, Clone, Default)]
pub struct AuthLayerConfig {
    /// Resource scope advertised in the challenge (`None` for the default challenge)
    pub challenge_scope: Option<String>,
    /// Request paths that skip validation (e.g., "/health")
    pub bypass_paths: Vec<String>,
}

impl AuthLayerConfig {
    /// Set the resource scope advertised in challenges
    #[must_use]
    pub fn challenge_scope(mut self, scope: impl Into<String>) -> Self {
        self.challenge_scope = Some(scope.into());
        self
    }

    /// Add a path to the bypass list
    #[must_use]
    pub fn bypass_path(mut self, path: impl Into<String>) -> Self {
        self.bypass_paths.push(path.into());
        self
    }

    /// Check if a path should bypass validation
    #[must_use]
    pub fn should_bypass(&self, path: &str) -> bool {
        self.bypass_paths.iter().any(|p| p == path)
    }
}
