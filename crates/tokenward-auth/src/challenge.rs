//! # Bearer Challenges (RFC 6750)
//!
//! Builds the `WWW-Authenticate` response sent when a request carries no
//! usable bearer token.
//!
//! ## Header Format
//!
//! ```text
//! WWW-Authenticate: Bearer scope="openid"
//! WWW-Authenticate: Bearer realm="payments", scope="openid payments"
//! ```
//!
//! The second form is produced when the protected resource names its own
//! scope. The resource's scope doubles as the realm, and `openid` is always
//! requested alongside it.
//!
//! ## Usage Example
//!
//! ```rust
//! use tokenward_auth::challenge::build_challenge;
//!
//! let challenge = build_challenge(Some("payments"));
//! assert_eq!(challenge.status, http::StatusCode::UNAUTHORIZED);
//! assert_eq!(
//!     challenge.header_value,
//!     r#"Bearer realm="payments", scope="openid payments""#
//! );
//! ```

use http::header::{HeaderName, HeaderValue, WWW_AUTHENTICATE};
use http::{Response, StatusCode};

/// Scope requested by every challenge
pub const DEFAULT_SCOPE: &str = "openid";

/// What to ask the client for when authentication fails
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerChallenge {
    /// The protected resource's own scope, if any
    scope: Option<String>,
}

impl BearerChallenge {
    /// Challenge for the given resource scope
    ///
    /// Surrounding whitespace is trimmed, so `" orders "` advertises `orders`.
    /// A blank scope, or the default scope itself, is treated as no scope.
    pub fn new(scope: Option<&str>) -> Self {
        let scope = scope
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != DEFAULT_SCOPE)
            .map(str::to_string);
        Self { scope }
    }

    /// The resource scope carried by this challenge
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Render the `WWW-Authenticate` value
    pub fn header_value(&self) -> String {
        match &self.scope {
            Some(scope) => {
                let scope = escape_param_value(scope);
                format!(
                    "Bearer realm=\"{}\", scope=\"{} {}\"",
                    scope, DEFAULT_SCOPE, scope
                )
            }
            None => format!("Bearer scope=\"{}\"", DEFAULT_SCOPE),
        }
    }
}

/// A ready-to-send 401 response description
#[derive(Debug, Clone)]
pub struct Challenge {
    /// Always `401 Unauthorized`
    pub status: StatusCode,
    /// Always `WWW-Authenticate`
    pub header_name: HeaderName,
    /// Rendered challenge
    pub header_value: HeaderValue,
}

impl Challenge {
    /// Build an empty-bodied response carrying the status and header
    pub fn into_response<B: Default>(self) -> Response<B> {
        let mut response = Response::new(B::default());
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(self.header_name, self.header_value);
        response
    }
}

/// Build the 401 challenge for a protected resource
///
/// Scope absent, blank or equal to `openid` yields `Bearer scope="openid"`;
/// any other scope yields `Bearer realm="{scope}", scope="openid {scope}"`.
/// A scope containing characters not allowed in a header value falls back to
/// the default challenge.
pub fn build_challenge(scope: Option<&str>) -> Challenge {
    let header_value = HeaderValue::from_str(&BearerChallenge::new(scope).header_value())
        .unwrap_or_else(|_| default_header_value());

    Challenge {
        status: StatusCode::UNAUTHORIZED,
        header_name: WWW_AUTHENTICATE,
        header_value,
    }
}

fn default_header_value() -> HeaderValue {
    HeaderValue::from_static("Bearer scope=\"openid\"")
}

/// Escape special characters in auth-param values
///
/// Quoted-string values need backslash escaping for quotes and backslashes.
fn escape_param_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_challenge() {
        let challenge = build_challenge(None);
        assert_eq!(challenge.status, StatusCode::UNAUTHORIZED);
        assert_eq!(challenge.header_name, WWW_AUTHENTICATE);
        assert_eq!(challenge.header_value, "Bearer scope=\"openid\"");
    }

    #[test]
    fn test_openid_scope_is_default() {
        assert_eq!(
            build_challenge(Some("openid")).header_value,
            "Bearer scope=\"openid\""
        );
    }

    #[test]
    fn test_blank_scope_is_default() {
        assert_eq!(
            build_challenge(Some("  ")).header_value,
            "Bearer scope=\"openid\""
        );
        assert_eq!(build_challenge(Some("")).header_value, "Bearer scope=\"openid\"");
    }

    #[test]
    fn test_resource_scope() {
        assert_eq!(
            build_challenge(Some("payments")).header_value,
            "Bearer realm=\"payments\", scope=\"openid payments\""
        );
    }

    #[test]
    fn test_resource_scope_is_trimmed() {
        assert_eq!(BearerChallenge::new(Some(" orders ")).scope(), Some("orders"));
        assert_eq!(
            build_challenge(Some(" orders ")).header_value,
            "Bearer realm=\"orders\", scope=\"openid orders\""
        );
    }

    #[test]
    fn test_escape_param_value() {
        let value = "Hello \"World\" with \\backslash";
        let escaped = escape_param_value(value);
        assert_eq!(escaped, "Hello \\\"World\\\" with \\\\backslash");
    }

    #[test]
    fn test_scope_with_quotes() {
        let challenge = BearerChallenge::new(Some("a\"b"));
        assert_eq!(
            challenge.header_value(),
            "Bearer realm=\"a\\\"b\", scope=\"openid a\\\"b\""
        );
    }

    #[test]
    fn test_invalid_header_characters_fall_back() {
        let challenge = build_challenge(Some("bad\nscope"));
        assert_eq!(challenge.header_value, "Bearer scope=\"openid\"");
    }

    #[test]
    fn test_into_response() {
        let response: Response<String> = build_challenge(Some("api")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Bearer realm=\"api\", scope=\"openid api\""
        );
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_challenge_is_deterministic() {
        assert_eq!(
            BearerChallenge::new(Some("orders")),
            BearerChallenge::new(Some(" orders "))
        );
        assert_eq!(BearerChallenge::new(Some("openid")).scope(), None);
    }
}
