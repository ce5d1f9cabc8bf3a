//! Exact path routing.
//!
//! A [`Router`] maps request paths to [`RouteHandler`]s. Matching is exact: no patterns,
//! no prefixes, no method filtering. Paths without a route fall through to static
//! resource serving.

use std::collections::HashMap;

use async_trait::async_trait;
use embed_http::handler::BoxError;
use embed_http::protocol::RequestEntity;
use futures::future::BoxFuture;
use tracing::debug;

use crate::HttpStream;

/// Answers the requests routed to one path.
///
/// The handler writes the complete response and returns whether the connection may
/// serve another request.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, request: &RequestEntity, stream: &mut HttpStream) -> Result<bool, BoxError>;
}

/// A [`RouteHandler`] backed by a closure, see [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// Wraps a closure returning a boxed future as a [`RouteHandler`].
///
/// ```no_run
/// use embed_web::router::handler_fn;
/// use futures::FutureExt;
///
/// let ping = handler_fn(|_request, _stream| async move { Ok(true) }.boxed());
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a RequestEntity, &'a mut HttpStream) -> BoxFuture<'a, Result<bool, BoxError>> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> RouteHandler for FnHandler<F>
where
    F: for<'a> Fn(&'a RequestEntity, &'a mut HttpStream) -> BoxFuture<'a, Result<bool, BoxError>> + Send + Sync,
{
    async fn handle(&self, request: &RequestEntity, stream: &mut HttpStream) -> Result<bool, BoxError> {
        (self.f)(request, stream).await
    }
}

/// Route table, immutable once built.
pub struct Router {
    routes: HashMap<String, Box<dyn RouteHandler>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("paths", &self.routes.keys().collect::<Vec<_>>()).finish()
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Handler registered for exactly `path`.
    pub fn at(&self, path: &str) -> Option<&dyn RouteHandler> {
        self.routes.get(path).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        RouterBuilder::new().build()
    }
}

#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<String, Box<dyn RouteHandler>>,
}

impl std::fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBuilder").field("paths", &self.routes.keys().collect::<Vec<_>>()).finish()
    }
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` for `path`, replacing an earlier registration of the same path.
    pub fn route(mut self, path: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        let path = path.into();
        if self.routes.insert(path.clone(), Box::new(handler)).is_some() {
            debug!(path, "replaced route handler");
        }
        self
    }

    pub fn build(self) -> Router {
        Router { routes: self.routes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embed_http::response::TextResponser;
    use futures::FutureExt;
    use http::StatusCode;

    struct Named(&'static str);

    #[async_trait]
    impl RouteHandler for Named {
        async fn handle(&self, _request: &RequestEntity, stream: &mut HttpStream) -> Result<bool, BoxError> {
            TextResponser::new(StatusCode::OK, self.0).send(stream).await?;
            Ok(true)
        }
    }

    #[test]
    fn exact_match_only() {
        let router = Router::builder().route("/api", Named("api")).build();

        assert!(router.at("/api").is_some());
        assert!(router.at("/api/").is_none());
        assert!(router.at("/API").is_none());
        assert!(router.at("/").is_none());
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn last_registration_wins() {
        let router = Router::builder()
            .route("/same", Named("first"))
            .route("/same", handler_fn(|_request, _stream| async move { Ok(false) }.boxed()))
            .build();

        assert_eq!(router.len(), 1);
        assert!(router.at("/same").is_some());
    }

    #[test]
    fn empty_router() {
        let router = Router::default();
        assert!(router.is_empty());
        assert!(router.at("/index.html").is_none());
    }
}
