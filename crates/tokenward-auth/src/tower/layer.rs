//! Tower Layer implementation for bearer token validation

use std::sync::Arc;
use tower::Layer;

use crate::validator::TokenValidator;

use super::AuthLayerConfig;
use super::service::IntrospectionService;

/// Tower Layer that validates bearer tokens before the inner service runs
///
/// # Example
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
/// use tokenward_auth::tower::IntrospectionLayer;
///
/// let service = ServiceBuilder::new()
///     .layer(IntrospectionLayer::new(validator))
///     .service(my_inner_service);
/// ```
#[derive(Debug)]
pub struct IntrospectionLayer<V> {
    /// The token validator
    validator: Arc<V>,
    /// Layer configuration
    config: AuthLayerConfig,
}

impl<V> Clone for IntrospectionLayer<V> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            config: self.config.clone(),
        }
    }
}

impl<V> IntrospectionLayer<V>
where
    V: TokenValidator,
{
    /// Create a new layer with default configuration
    pub fn new(validator: V) -> Self {
        Self::from_arc(Arc::new(validator))
    }

    /// Create a new layer with custom configuration
    pub fn with_config(validator: V, config: AuthLayerConfig) -> Self {
        Self::from_arc_with_config(Arc::new(validator), config)
    }

    /// Create a new layer from an Arc'd validator
    pub fn from_arc(validator: Arc<V>) -> Self {
        Self::from_arc_with_config(validator, AuthLayerConfig::default())
    }

    /// Create a new layer from an Arc'd validator with custom configuration
    pub fn from_arc_with_config(validator: Arc<V>, config: AuthLayerConfig) -> Self {
        Self { validator, config }
    }

    /// Set the resource scope advertised in challenges
    #[must_use]
    pub fn challenge_scope(mut self, scope: impl Into<String>) -> Self {
        self.config.challenge_scope = Some(scope.into());
        self
    }

    /// Add a path that skips validation
    #[must_use]
    pub fn bypass_path(mut self, path: impl Into<String>) -> Self {
        self.config.bypass_paths.push(path.into());
        self
    }
}

impl<S, V> Layer<S> for IntrospectionLayer<V>
where
    V: TokenValidator,
{
    type Service = IntrospectionService<S, V>;

    fn layer(&self, inner: S) -> Self::Service {
        IntrospectionService::new(inner, Arc::clone(&self.validator), self.config.clone())
    }
}
