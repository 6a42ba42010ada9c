//! Tower Service implementation for bearer token validation
//!
//! [`IntrospectionService`] implements `Service<http::Request<B>>` and works
//! with any HTTP stack built on the `http` crate (Axum, Tower-HTTP, hyper).
//!
//! For each request it:
//! - Skips validation for configured bypass paths
//! - Hands the raw `Authorization` header to the [`TokenValidator`]
//! - Inserts the resulting [`AuthenticatedIdentity`] into the request extensions
//! - Answers with a `401` challenge when no identity comes back

use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use http::header::AUTHORIZATION;
use tower_service::Service;
use tracing::debug;

use crate::challenge::build_challenge;
use crate::error::ErrorKind;
use crate::validator::{AuthenticatedIdentity, TokenValidator};

use super::AuthLayerConfig;

/// Tower Service that validates bearer tokens
///
/// # Type Parameters
///
/// * `S` - The inner service type
/// * `V` - The token validator type
#[derive(Debug)]
pub struct IntrospectionService<S, V> {
    inner: S,
    validator: Arc<V>,
    config: AuthLayerConfig,
}

impl<S: Clone, V> Clone for IntrospectionService<S, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            validator: Arc::clone(&self.validator),
            config: self.config.clone(),
        }
    }
}

impl<S, V> IntrospectionService<S, V>
where
    V: TokenValidator,
{
    /// Create a new introspection service
    pub fn new(inner: S, validator: Arc<V>, config: AuthLayerConfig) -> Self {
        Self {
            inner,
            validator,
            config,
        }
    }

    /// Get a reference to the inner service
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get a mutable reference to the inner service
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

/// Future type for introspection service responses
///
/// Resolves to the inner service's response on success, or to a `401`
/// challenge response when validation fails.
pub type IntrospectionServiceFuture<T, E> = BoxFuture<'static, Result<T, E>>;

impl<S, V, B, ResBody> Service<http::Request<B>> for IntrospectionService<S, V>
where
    S: Service<http::Request<B>, Response = http::Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    V: TokenValidator + 'static,
    B: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = http::Response<ResBody>;
    type Error = S::Error;
    type Future = IntrospectionServiceFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        // Take the readied service, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if self.config.should_bypass(req.uri().path()) {
            return Box::pin(async move { inner.call(req).await });
        }

        let challenge_scope = self.config.challenge_scope.clone();
        let authorization = match req.headers().get(AUTHORIZATION).map(|v| v.to_str()) {
            None => None,
            Some(Ok(value)) => Some(value.to_owned()),
            Some(Err(_)) => {
                debug!(
                    kind = %ErrorKind::MalformedHeader,
                    "Authorization header is not visible ASCII"
                );
                return Box::pin(async move {
                    Ok(build_challenge(challenge_scope.as_deref()).into_response())
                });
            }
        };

        let validator = Arc::clone(&self.validator);
        Box::pin(async move {
            match validator
                .validate_authorization(authorization.as_deref())
                .await
            {
                Some(identity) => {
                    req.extensions_mut().insert::<AuthenticatedIdentity>(identity);
                    inner.call(req).await
                }
                None => Ok(build_challenge(challenge_scope.as_deref()).into_response()),
            }
        })
    }
}
