//! Optional lifecycle phases
//!
//! A module opts into these when it is registered, through
//! [`ModuleBuilder::with_bootstrap`](crate::module::ModuleBuilder::with_bootstrap)
//! and [`ModuleBuilder::with_shutdown`](crate::module::ModuleBuilder::with_shutdown).

use super::LifecycleError;
use async_trait::async_trait;

/// Called after every module has been initialized
///
/// Use this hook to:
/// - Start background tasks
/// - Warm caches that depend on services from other modules
/// - Verify that required providers were registered
///
/// # Example
///
/// ```rust,ignore
/// #[async_trait]
/// impl OnApplicationBootstrap for CacheModule {
///     async fn on_application_bootstrap(&mut self) -> Result<(), LifecycleError> {
///         self.warm().await
///             .map_err(|e| LifecycleError::bootstrap_failed(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait OnApplicationBootstrap: Send + Sync {
    /// The last hook before the server starts accepting requests.
    async fn on_application_bootstrap(&mut self) -> Result<(), LifecycleError>;
}

/// Called during teardown, after the HTTP listener has stopped
///
/// Use this hook to:
/// - Flush buffers
/// - Close connections
/// - Cancel background tasks
///
/// A failing hook does not prevent the remaining modules' hooks from running.
#[async_trait]
pub trait OnApplicationShutdown: Send + Sync {
    async fn on_application_shutdown(&mut self) -> Result<(), LifecycleError>;
}
