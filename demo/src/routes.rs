//! HTTP routes
//!
//! `GET /simple` greets the token's subject. Everything under the
//! introspection layer answers `401` with a bearer challenge when the token
//! is missing or not active.

use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Json, Router};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use serde_json::{Value, json};
use tokenward_auth::tower::IntrospectionLayer;
use tokenward_auth::{AuthenticatedIdentity, TokenValidator};
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Build the application router
///
/// `challenge_scope` is advertised as realm and scope in `401` challenges.
pub fn router<V>(validator: Arc<V>, challenge_scope: &str) -> Router
where
    V: TokenValidator + 'static,
{
    let protected = Router::new()
        .route("/simple", get(simple))
        .route_layer(IntrospectionLayer::from_arc(validator).challenge_scope(challenge_scope));

    Router::new()
        .merge(protected)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
}

/// Any origin and method; only the headers a bearer client needs
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .expose_headers([WWW_AUTHENTICATE, CONTENT_TYPE])
}

async fn simple(Extension(identity): Extension<AuthenticatedIdentity>) -> Json<Value> {
    debug!(subject = ?identity.subject, "Serving /simple");
    Json(json!({ "hello": identity.subject }))
}
