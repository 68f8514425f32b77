use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{Next, from_fn},
    response::{IntoResponse, Response},
    routing::{MethodRouter, Route},
};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tower::{Layer, Service};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

type Wrap = dyn Fn(MethodRouter) -> MethodRouter + Send + Sync;

/// A handler transformer applied by [`Router::handle`](super::Router::handle).
///
/// Middleware is a pure function from one handler to another; it runs once
/// per route at registration time and must not have other side effects.
#[derive(Clone)]
pub struct Middleware {
    wrap: Arc<Wrap>,
}

impl Middleware {
    pub fn new<F>(wrap: F) -> Self
    where
        F: Fn(MethodRouter) -> MethodRouter + Send + Sync + 'static,
    {
        Self {
            wrap: Arc::new(wrap),
        }
    }

    /// Wrap every handler in a tower layer, e.g. `axum::middleware::from_fn(..)`
    /// or anything from `tower-http`.
    pub fn layer<L>(layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self::new(move |handler| handler.layer(layer.clone()))
    }

    pub(crate) fn apply(&self, handler: MethodRouter) -> MethodRouter {
        (self.wrap)(handler)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// Logs method, URI, status and latency of every request.
pub fn request_logging() -> Middleware {
    Middleware::layer(from_fn(log_request))
}

/// Tags requests and responses with an `x-request-id` header, keeping the
/// caller's id when one was sent.
pub fn request_id() -> Middleware {
    Middleware::layer(from_fn(assign_request_id))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    tracing::debug!(%method, %uri, "--> request");
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed = ?start.elapsed(),
        "<-- response"
    );

    response
}

async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());

    if let Some(id) = &id {
        request.headers_mut().insert(REQUEST_ID_HEADER, id.clone());
    }
    let mut response = next.run(request).await;
    if let Some(id) = id {
        response.headers_mut().insert(REQUEST_ID_HEADER, id);
    }

    response
}
