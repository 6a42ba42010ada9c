//! OAuth 2.0 Token Introspection (RFC 7662)
//!
//! Asks the Authorization Server whether an opaque access token is currently
//! active. The request is authenticated with HTTP Basic over the relying
//! party's client credentials; the end user's token travels in the form body.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokenward_auth::ClientCredentials;
//! use tokenward_auth::introspection::IntrospectionClient;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = ClientCredentials::new("https://login.example.com/uas", "api", "secret")?;
//! let client = IntrospectionClient::new(reqwest::Client::new(), credentials.into(), 64 * 1024);
//!
//! let endpoint = Url::parse("https://login.example.com/uas/introspect")?;
//! let response = client.introspect(&endpoint, "access_token_here").await?;
//!
//! if response.is_active() {
//!     println!("Token is valid for {:?}", response.sub);
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::debug;
use url::Url;

use crate::config::ClientCredentials;
use crate::error::{AuthError, AuthResult};
use crate::header::basic_authorization;

/// Token introspection request per RFC 7662 Section 2.1
#[derive(Clone, Serialize)]
pub struct IntrospectionRequest<'a> {
    /// The token to introspect (REQUIRED)
    pub token: &'a str,
}

// Manual Debug impl to prevent token exposure in logs
impl std::fmt::Debug for IntrospectionRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrospectionRequest")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Token introspection response per RFC 7662 Section 2.2
///
/// `active` is modelled as optional: servers that omit it or send `null`
/// are treated exactly like `"active": false`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct IntrospectionResponse {
    /// Whether the token is currently active
    #[serde(default)]
    pub active: Option<bool>,

    /// Scope(s) associated with the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Client identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Username (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Token type (Bearer, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiration timestamp (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    /// Issued at timestamp (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Not before timestamp (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,

    /// Subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audience
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Additional fields
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl IntrospectionResponse {
    /// True only when the server sent `"active": true`
    pub fn is_active(&self) -> bool {
        self.active == Some(true)
    }
}

/// Token introspection client
///
/// Holds the relying party's credentials and a shared HTTP client. The
/// endpoint is passed per call because it comes from discovery.
#[derive(Clone)]
pub struct IntrospectionClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Credentials for authenticating with the introspection endpoint
    credentials: Arc<ClientCredentials>,

    /// Maximum accepted body size
    max_response_bytes: usize,
}

// Manual Debug impl to prevent client_secret exposure in logs
impl std::fmt::Debug for IntrospectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrospectionClient")
            .field("credentials", &self.credentials)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("http_client", &"<reqwest::Client>")
            .finish()
    }
}

impl IntrospectionClient {
    /// Create a new introspection client
    pub fn new(
        http_client: reqwest::Client,
        credentials: Arc<ClientCredentials>,
        max_response_bytes: usize,
    ) -> Self {
        Self {
            http_client,
            credentials,
            max_response_bytes,
        }
    }

    /// Build the introspection request without sending it
    ///
    /// `POST {endpoint}` with `Authorization: Basic base64(client_id:client_secret)`
    /// and a form body carrying only `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the credentials cannot form a
    /// header, or [`AuthError::Network`] if the request cannot be built.
    pub fn build_request(&self, endpoint: &Url, token: &str) -> AuthResult<reqwest::Request> {
        let authorization = basic_authorization(
            &self.credentials.client_id,
            self.credentials.client_secret.expose_secret(),
        )?;

        self.http_client
            .post(endpoint.clone())
            .header(http::header::AUTHORIZATION, authorization)
            .header(http::header::ACCEPT, "application/json")
            .form(&IntrospectionRequest { token })
            .build()
            .map_err(|e| AuthError::Network(format!("failed to build introspection request: {e}")))
    }

    /// Introspect a token per RFC 7662
    ///
    /// # Errors
    ///
    /// - [`AuthError::Network`] if the request fails or times out
    /// - [`AuthError::EndpointRejected`] if the endpoint answers with a non-2xx status
    /// - [`AuthError::Parse`] if the response body is not a valid introspection response
    pub async fn introspect(&self, endpoint: &Url, token: &str) -> AuthResult<IntrospectionResponse> {
        let request = self.build_request(endpoint, token)?;

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::from_reqwest("introspection request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            debug!("Introspection endpoint {} returned {}", endpoint, status);
            return Err(AuthError::EndpointRejected {
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length()
            && content_length > self.max_response_bytes as u64
        {
            return Err(AuthError::Parse(
                "introspection response exceeds size limit".to_string(),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::from_reqwest("failed to read introspection response", e))?;

        if body.len() > self.max_response_bytes {
            return Err(AuthError::Parse(
                "introspection response exceeds size limit".to_string(),
            ));
        }

        serde_json::from_slice::<IntrospectionResponse>(&body)
            .map_err(|e| AuthError::Parse(format!("failed to parse introspection response: {e}")))
    }
}
