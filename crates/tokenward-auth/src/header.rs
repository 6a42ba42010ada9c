//! `Authorization` header handling
//!
//! Inbound: split a credentials value into scheme and parameter, and pick out
//! bearer tokens. Malformed input is an expected, frequent case, so parsing
//! returns `Option`/`Result` values rather than failing loudly.
//!
//! Outbound: build the HTTP Basic header that authenticates this service to
//! the introspection endpoint.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;

use crate::error::{AuthError, AuthResult};

/// The `Bearer` authentication scheme (RFC 6750)
pub const BEARER_SCHEME: &str = "Bearer";

/// A parsed `Authorization` header: `<scheme> [parameter]`
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    scheme: String,
    parameter: Option<String>,
}

// Parameter may be a credential; keep it out of Debug output
impl fmt::Debug for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationHeader")
            .field("scheme", &self.scheme)
            .field("parameter", &self.parameter.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthorizationHeader {
    /// Parse a raw header value
    ///
    /// Returns `None` when the value is blank, when the scheme is not a valid
    /// RFC 7230 token, when the scheme is not followed by whitespace before the
    /// parameter, or when the value contains CR, LF or NUL.
    pub fn parse(value: &str) -> Option<Self> {
        if value.contains(['\r', '\n', '\0']) {
            return None;
        }

        let value = value.trim_matches(is_ows);
        if value.is_empty() {
            return None;
        }

        let scheme_end = value.find(|c: char| !is_tchar(c)).unwrap_or(value.len());
        if scheme_end == 0 {
            return None;
        }

        let (scheme, rest) = value.split_at(scheme_end);
        if !rest.is_empty() && !rest.starts_with(is_ows) {
            return None;
        }

        let parameter = rest.trim_matches(is_ows);
        Some(Self {
            scheme: scheme.to_string(),
            parameter: (!parameter.is_empty()).then(|| parameter.to_string()),
        })
    }

    /// The authentication scheme as sent by the client
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The credentials following the scheme, if any
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Whether the scheme is `Bearer`, compared case-insensitively
    pub fn is_bearer(&self) -> bool {
        self.scheme.eq_ignore_ascii_case(BEARER_SCHEME)
    }
}

/// An opaque bearer token taken from an `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// The raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Extract a bearer token from an optional `Authorization` header value
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`] if the value is absent or blank
/// - [`AuthError::MalformedHeader`] if it does not parse, is not a `Bearer`
///   credential, or carries no token
pub fn parse_bearer(authorization: Option<&str>) -> AuthResult<BearerToken> {
    let value = match authorization {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(AuthError::MissingCredentials),
    };

    let header = AuthorizationHeader::parse(value)
        .ok_or_else(|| AuthError::MalformedHeader("unparseable credentials".to_string()))?;

    if !header.is_bearer() {
        return Err(AuthError::MalformedHeader(format!(
            "unsupported scheme '{}'",
            header.scheme()
        )));
    }

    header
        .parameter()
        .map(|token| BearerToken(token.to_string()))
        .ok_or_else(|| AuthError::MalformedHeader("bearer token is empty".to_string()))
}

/// Build `Basic base64(client_id:client_secret)` for client authentication
///
/// # Errors
///
/// Returns [`AuthError::Configuration`] if the encoded value is not a valid
/// header value.
pub fn basic_authorization(client_id: &str, client_secret: &str) -> AuthResult<HeaderValue> {
    let encoded = STANDARD.encode(format!("{client_id}:{client_secret}").as_bytes());
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| AuthError::Configuration(format!("invalid client credentials: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

fn is_ows(c: char) -> bool {
    c == ' ' || c == '\t'
}

// tchar per RFC 7230 section 3.2.6
fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
