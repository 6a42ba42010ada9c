//! # Authorization Server Discovery
//!
//! Resolves the introspection endpoint from an issuer's discovery document,
//! either OAuth 2.0 Authorization Server Metadata (RFC 8414) or OpenID Connect
//! Discovery 1.0.
//!
//! ## Discovery Endpoints
//!
//! - **RFC 8414** (default): `{issuer}/.well-known/oauth-authorization-server`
//! - **OIDC Discovery 1.0**: `{issuer}/.well-known/openid-configuration`
//!
//! The flavor is chosen by configuration. There is no fallback from one to the
//! other: a failed fetch is reported as is.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tokenward_auth::discovery::{DiscoveryFlavor, MetadataResolver};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = MetadataResolver::new(
//!     reqwest::Client::new(),
//!     DiscoveryFlavor::OAuthAuthorizationServer,
//!     64 * 1024,
//! );
//!
//! let issuer = Url::parse("https://login.example.com/uas")?;
//! let metadata = resolver.resolve(&issuer).await?;
//! println!("Introspect at {}", metadata.introspection_endpoint());
//! # Ok(())
//! # }
//! ```

mod resolver;
mod types;

pub use resolver::MetadataResolver;
pub use types::{DiscoveryDocument, DiscoveryFlavor, ServerMetadata};
