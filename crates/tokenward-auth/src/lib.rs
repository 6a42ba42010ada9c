//! # Tokenward Auth - Bearer Token Validation via Introspection
//!
//! Validates inbound OAuth 2.0 bearer tokens by asking the Authorization Server
//! whether they are active (RFC 7662), and builds the RFC 6750
//! `WWW-Authenticate` challenge when they are not.
//!
//! ## Flow
//!
//! 1. Parse the `Authorization` header ([`header`])
//! 2. Resolve the introspection endpoint from the issuer's discovery document ([`discovery`])
//! 3. POST the token to the introspection endpoint with client credentials ([`introspection`])
//! 4. Accept the token only when `active` is `true` ([`validator`])
//! 5. Otherwise answer `401` with a bearer challenge ([`challenge`])
//!
//! Every failure collapses to "no identity" at the validator boundary and is
//! logged under a stable `kind` ([`ErrorKind`]). Callers only branch on
//! presence or absence of an identity.
//!
//! ## Architecture
//!
//! - [`config`] - Client credentials and validator settings
//! - [`header`] - `Authorization` header parsing and Basic client authentication
//! - [`discovery`] - Metadata Resolver (RFC 8414 / OIDC Discovery)
//! - [`introspection`] - RFC 7662 request/response types and client
//! - [`validator`] - Introspection Validator and the [`TokenValidator`] seam
//! - [`challenge`] - Challenge Builder
//! - [`error`] - Error taxonomy
//! - `tower` - Tower middleware (feature `middleware`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tokenward_auth::{
//!     ClientCredentials, IntrospectionConfig, IntrospectionValidator, build_challenge,
//! };
//!
//! # async fn example(header: Option<&str>) -> Result<(), tokenward_auth::AuthError> {
//! let credentials = ClientCredentials::new("https://login.example.com/uas", "api", "secret")?;
//! let validator = IntrospectionValidator::new(credentials, &IntrospectionConfig::default())?;
//!
//! match validator.validate_authorization(header).await {
//!     Some(identity) => println!("hello {:?}", identity.subject),
//!     None => {
//!         let challenge = build_challenge(Some("api"));
//!         println!("{} {}", challenge.status, challenge.header_value.to_str().unwrap_or(""));
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `middleware` (default) - Tower layer and service
//!
//! ## Standards Compliance
//!
//! - **RFC 6750** - OAuth 2.0 Bearer Token Usage
//! - **RFC 7662** - OAuth 2.0 Token Introspection
//! - **RFC 8414** - OAuth 2.0 Authorization Server Metadata
//! - **OpenID Connect Discovery 1.0**

#![cfg_attr(docsrs, feature(doc_cfg))]

// Submodules
pub mod challenge;
pub mod config;
pub mod discovery;
pub mod error;
pub mod header;
pub mod introspection;
pub mod validator;

#[cfg(feature = "middleware")]
#[cfg_attr(docsrs, doc(cfg(feature = "middleware")))]
pub mod tower;

#[doc(inline)]
pub use challenge::{BearerChallenge, Challenge, DEFAULT_SCOPE, build_challenge};
#[doc(inline)]
pub use config::{ClientCredentials, IntrospectionConfig};
#[doc(inline)]
pub use discovery::{DiscoveryFlavor, MetadataResolver, ServerMetadata};
#[doc(inline)]
pub use error::{AuthError, AuthResult, ErrorKind};
#[doc(inline)]
pub use introspection::{IntrospectionClient, IntrospectionResponse};
#[doc(inline)]
pub use validator::{AuthenticatedIdentity, IntrospectionValidator, TokenValidator};

// Used by `IntrospectionValidator::validate_authorization_with_cancellation`
pub use tokio_util::sync::CancellationToken;
