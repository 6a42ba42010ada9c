//! Error taxonomy for bearer token validation
//!
//! Every failure inside validation is one of these variants. They exist for
//! diagnostics only: at the validator boundary they all collapse into "no
//! identity", and the caller answers with the same 401 challenge regardless
//! of which one occurred.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised while validating a bearer token
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no `Authorization` header, or only whitespace
    #[error("no authorization header present")]
    MissingCredentials,

    /// The header could not be parsed, used a non-Bearer scheme, or carried no token
    #[error("malformed authorization header: {0}")]
    MalformedHeader(String),

    /// Connectivity failure, timeout or non-success status while talking to the
    /// Authorization Server
    #[error("network error: {0}")]
    Network(String),

    /// A discovery document or introspection response could not be interpreted
    #[error("parse error: {0}")]
    Parse(String),

    /// The introspection endpoint answered with a non-2xx status
    #[error("introspection endpoint returned HTTP {status}")]
    EndpointRejected {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// The introspection response was well formed but `active` was not `true`
    #[error("token is not active")]
    InactiveToken,

    /// Invalid client credentials or settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The validation was cancelled before it completed
    #[error("validation cancelled")]
    Cancelled,
}

impl AuthError {
    /// Diagnostic classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredentials => ErrorKind::MissingCredentials,
            AuthError::MalformedHeader(_) => ErrorKind::MalformedHeader,
            AuthError::Network(_) => ErrorKind::Network,
            AuthError::Parse(_) => ErrorKind::Parse,
            AuthError::EndpointRejected { .. } => ErrorKind::EndpointRejected,
            AuthError::InactiveToken => ErrorKind::InactiveToken,
            AuthError::Configuration(_) => ErrorKind::Configuration,
            AuthError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether this error points at the Authorization Server or the network
    /// rather than at the caller's credentials.
    ///
    /// Operators care about these; callers never see the difference.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Network(_) | AuthError::Parse(_) | AuthError::EndpointRejected { .. }
        )
    }

    pub(crate) fn from_reqwest(context: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AuthError::Network(format!("{context}: request timed out"))
        } else if error.is_decode() {
            AuthError::Parse(format!("{context}: {error}"))
        } else {
            AuthError::Network(format!("{context}: {error}"))
        }
    }
}

/// Stable names for [`AuthError`] variants, used as the `kind` field in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AuthError::MissingCredentials`]
    MissingCredentials,
    /// See [`AuthError::MalformedHeader`]
    MalformedHeader,
    /// See [`AuthError::Network`]
    Network,
    /// See [`AuthError::Parse`]
    Parse,
    /// See [`AuthError::EndpointRejected`]
    EndpointRejected,
    /// See [`AuthError::InactiveToken`]
    InactiveToken,
    /// See [`AuthError::Configuration`]
    Configuration,
    /// See [`AuthError::Cancelled`]
    Cancelled,
}

impl ErrorKind {
    /// Name used in structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingCredentials => "MissingCredentials",
            ErrorKind::MalformedHeader => "MalformedHeaderError",
            ErrorKind::Network => "NetworkError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::EndpointRejected => "EndpointRejected",
            ErrorKind::InactiveToken => "InactiveTokenError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(AuthError::Network("x".into()).kind().as_str(), "NetworkError");
        assert_eq!(AuthError::Parse("x".into()).kind().as_str(), "ParseError");
        assert_eq!(AuthError::InactiveToken.kind().as_str(), "InactiveTokenError");
        assert_eq!(
            AuthError::MalformedHeader("x".into()).kind().to_string(),
            "MalformedHeaderError"
        );
    }

    #[test]
    fn test_infrastructure_classification() {
        assert!(AuthError::Network("refused".into()).is_infrastructure());
        assert!(AuthError::Parse("bad json".into()).is_infrastructure());
        assert!(AuthError::EndpointRejected { status: 503 }.is_infrastructure());

        assert!(!AuthError::InactiveToken.is_infrastructure());
        assert!(!AuthError::MissingCredentials.is_infrastructure());
        assert!(!AuthError::MalformedHeader("Basic".into()).is_infrastructure());
    }

    #[test]
    fn test_display() {
        let err = AuthError::EndpointRejected { status: 500 };
        assert_eq!(err.to_string(), "introspection endpoint returned HTTP 500");
    }
}
