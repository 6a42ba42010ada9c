//! Tower middleware driven by a real validator and a mock Authorization Server

#![cfg(feature = "middleware")]

mod common;

use common::MockAuthorizationServer;
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::{Request, Response, StatusCode};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokenward_auth::tower::IntrospectionLayer;
use tokenward_auth::{AuthenticatedIdentity, IntrospectionConfig};
use tower::{Layer, ServiceExt, service_fn};

async fn hello(req: Request<String>) -> Result<Response<String>, Infallible> {
    let identity = req
        .extensions()
        .get::<AuthenticatedIdentity>()
        .cloned()
        .expect("identity must be present behind the layer");
    Ok(Response::new(
        json!({ "hello": identity.subject }).to_string(),
    ))
}

fn request(authorization: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().uri("/simple");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(String::new()).unwrap()
}

fn assert_default_challenge(response: &Response<String>) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(WWW_AUTHENTICATE).unwrap(),
        "Bearer scope=\"openid\""
    );
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn test_no_header_gets_challenge() {
    let mock = MockAuthorizationServer::start().await;
    let service = IntrospectionLayer::new(mock.validator()).layer(service_fn(hello));

    let response = service.oneshot(request(None)).await.unwrap();

    assert_default_challenge(&response);
    mock.assert_untouched().await;
}

#[tokio::test]
async fn test_active_token_reaches_handler() {
    let mock = MockAuthorizationServer::start().await;
    mock.mock_discovery(1).await;
    mock.mock_introspection("abc123", json!({"active": true, "sub": "u1"}), 1)
        .await;
    let service = IntrospectionLayer::new(mock.validator()).layer(service_fn(hello));

    let response = service
        .oneshot(request(Some("Bearer abc123")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), r#"{"hello":"u1"}"#);
}

#[tokio::test]
async fn test_inactive_token_gets_same_challenge() {
    let mock = MockAuthorizationServer::start().await;
    mock.mock_discovery(1).await;
    mock.mock_introspection("abc123", json!({"active": false}), 1)
        .await;
    let service = IntrospectionLayer::new(mock.validator()).layer(service_fn(hello));

    let response = service
        .oneshot(request(Some("Bearer abc123")))
        .await
        .unwrap();

    assert_default_challenge(&response);
}

#[tokio::test]
async fn test_unreachable_server_is_never_a_server_error() {
    let mock = MockAuthorizationServer::start().await;
    mock.mock_slow_discovery(Duration::from_secs(5)).await;
    let config = IntrospectionConfig::default().with_request_timeout(Duration::from_secs(1));
    let service = IntrospectionLayer::new(mock.validator_with(config))
        .challenge_scope("api")
        .layer(service_fn(hello));

    let response = service
        .oneshot(request(Some("Bearer abc123")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(WWW_AUTHENTICATE).unwrap(),
        "Bearer realm=\"api\", scope=\"openid api\""
    );
}
