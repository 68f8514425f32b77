use crate::error::Result;
use crate::router::Router;
use std::sync::Arc;

/// An HTTP controller: a group of routes sharing state.
///
/// Modules usually build their controllers during `initialize` and hand
/// them to [`ModuleContext::add_controller`](crate::module::ModuleContext::add_controller).
///
/// # Example
/// ```rust,ignore
/// struct HealthController;
///
/// impl Controller for HealthController {
///     fn register_routes(self: Arc<Self>, router: &mut Router) -> Result<()> {
///         router.handle("/health", get(|| async { "ok" }))
///     }
/// }
/// ```
pub trait Controller: Send + Sync + 'static {
    /// Bind this controller's endpoints to `router`.
    fn register_routes(self: Arc<Self>, router: &mut Router) -> Result<()>;
}
