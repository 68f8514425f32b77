//! Pattern-based routing with centrally configured middleware.
//!
//! Middleware is captured when a route is registered: routes added before a
//! call to [`Router::use_middleware`] do not receive it. The first registered
//! middleware is the outermost wrapper, so for `[A, B]` a request flows
//! `A -> B -> handler -> B -> A`.

mod middleware;

pub use middleware::{Middleware, REQUEST_ID_HEADER, request_id, request_logging};

use crate::error::{Result, SailError};
use axum::{extract::Request, response::Response, routing::MethodRouter};
use tower::ServiceExt;

#[derive(Clone, Default)]
pub struct Router {
    inner: axum::Router,
    middleware: Vec<Middleware>,
    patterns: Vec<String>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware; it applies to routes registered from now on.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Register `handler` under `pattern`, wrapped in the current middleware
    /// chain.
    ///
    /// Pattern syntax is axum's (`/users/{id}`, `/files/{*path}`). Captures
    /// must span a whole segment, and a catch-all must be the last one.
    ///
    /// # Errors
    ///
    /// [`SailError::InvalidRoute`] if `pattern` is malformed,
    /// [`SailError::DuplicateRoute`] if it matches the same paths as a
    /// registered pattern, e.g. `/users/{name}` after `/users/{id}`.
    pub fn handle(&mut self, pattern: &str, handler: MethodRouter) -> Result<()> {
        let shape = route_shape(pattern)?;
        if self
            .patterns
            .iter()
            .any(|existing| route_shape(existing).is_ok_and(|other| other == shape))
        {
            return Err(SailError::DuplicateRoute {
                pattern: pattern.to_string(),
            });
        }

        let handler = self
            .middleware
            .iter()
            .rev()
            .fold(handler, |inner, middleware| middleware.apply(inner));

        self.inner = std::mem::take(&mut self.inner).route(pattern, handler);
        self.patterns.push(pattern.to_string());
        tracing::debug!(pattern, middleware = self.middleware.len(), "Route registered");
        Ok(())
    }

    /// Dispatch a single request. Unknown paths get axum's empty 404.
    pub async fn serve(&self, request: Request) -> Response {
        match self.inner.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Registered patterns in registration order.
    pub fn routes(&self) -> &[String] {
        &self.patterns
    }

    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    pub fn into_axum(self) -> axum::Router {
        self.inner
    }
}

/// Checks `pattern` and returns it with every capture replaced by `{}`.
///
/// Two patterns with the same shape match the same requests, which axum
/// refuses with a panic.
fn route_shape(pattern: &str) -> Result<String> {
    let invalid = |reason: &str| SailError::InvalidRoute {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    let Some(rest) = pattern.strip_prefix('/') else {
        return Err(invalid("pattern must start with '/'"));
    };

    let segments: Vec<&str> = rest.split('/').collect();
    let mut shape = String::with_capacity(pattern.len());
    for (index, segment) in segments.iter().enumerate() {
        shape.push('/');
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid("use '{name}' or '{*name}' captures"));
        }
        if !segment.contains(['{', '}']) {
            shape.push_str(segment);
            continue;
        }

        let name = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| invalid("a capture must be a whole '{name}' segment"))?;
        let (name, catch_all) = match name.strip_prefix('*') {
            Some(name) => (name, true),
            None => (name, false),
        };
        if name.is_empty() || name.contains(['{', '}', '*']) {
            return Err(invalid("capture names must be non-empty plain text"));
        }
        if catch_all && index + 1 != segments.len() {
            return Err(invalid("a catch-all capture must be the last segment"));
        }
        shape.push_str("{}");
    }
    Ok(shape)
}
