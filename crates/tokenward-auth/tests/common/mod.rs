//! Common test utilities for integration tests
//!
//! This module provides a mock Authorization Server publishing a discovery
//! document and an RFC 7662 introspection endpoint.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::time::Duration;
use tokenward_auth::{ClientCredentials, IntrospectionConfig, IntrospectionValidator};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string, header, method, path},
};

pub const CLIENT_ID: &str = "api";
pub const CLIENT_SECRET: &str = "secret";
/// `Basic base64("api:secret")`
pub const CLIENT_AUTHORIZATION: &str = "Basic YXBpOnNlY3JldA==";

pub const DISCOVERY_PATH: &str = "/.well-known/oauth-authorization-server";
pub const INTROSPECTION_PATH: &str = "/introspect";

/// Mock Authorization Server
pub struct MockAuthorizationServer {
    pub server: MockServer,
    pub issuer: String,
    pub introspection_endpoint: String,
}

impl MockAuthorizationServer {
    /// Start a new mock Authorization Server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();

        Self {
            server,
            issuer: base_url.clone(),
            introspection_endpoint: format!("{}{}", base_url, INTROSPECTION_PATH),
        }
    }

    /// Client credentials pointing at this server
    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials::new(&self.issuer, CLIENT_ID, CLIENT_SECRET).unwrap()
    }

    /// Validator with the default configuration
    pub fn validator(&self) -> IntrospectionValidator {
        self.validator_with(IntrospectionConfig::default())
    }

    /// Validator with a custom configuration
    pub fn validator_with(&self, config: IntrospectionConfig) -> IntrospectionValidator {
        IntrospectionValidator::new(self.credentials(), &config).unwrap()
    }

    /// Mock the discovery document, expecting `times` fetches
    pub async fn mock_discovery(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": self.issuer,
                "introspection_endpoint": self.introspection_endpoint,
                "introspection_endpoint_auth_methods_supported": ["client_secret_basic"],
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mock a discovery document that takes `delay` to arrive
    pub async fn mock_slow_discovery(&self, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "introspection_endpoint": self.introspection_endpoint,
                    }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a discovery endpoint that fails with `status`
    pub async fn mock_discovery_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mock the introspection endpoint for `token`, expecting `times` calls
    ///
    /// Only matches requests carrying the expected client authentication and form body.
    pub async fn mock_introspection(&self, token: &str, response: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(INTROSPECTION_PATH))
            .and(header("authorization", CLIENT_AUTHORIZATION))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(format!("token={}", token)))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mock an introspection endpoint that fails with `status`
    pub async fn mock_introspection_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(INTROSPECTION_PATH))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"error": "invalid_client"})),
            )
            .mount(&self.server)
            .await;
    }

    /// Assert that nothing was requested from this server
    pub async fn assert_untouched(&self) {
        let requests = self.server.received_requests().await.unwrap_or_default();
        assert!(
            requests.is_empty(),
            "expected no outbound calls, got {}",
            requests.len()
        );
    }
}

/// Active introspection response for `sub`
pub fn active_response(sub: &str) -> Value {
    json!({
        "active": true,
        "sub": sub,
        "client_id": "spa",
        "scope": "openid profile",
        "token_type": "Bearer",
    })
}
