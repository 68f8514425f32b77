//! Lifecycle Module
//!
//! Drives registered modules through startup and teardown, and runs the
//! HTTP listener in between.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Module Registration
//!    ↓
//! 2. Module::initialize (each module, registration order)
//!    ↓
//! 3. OnApplicationBootstrap (each opted-in module)
//!    ↓
//! 4. Container frozen, server start
//!    ↓
//! [Running...]
//!    ↓
//! 5. Shutdown Signal (SIGTERM/SIGINT) or listener failure
//!    ↓
//! 6. Graceful listener stop (bounded)
//!    ↓
//! 7. OnApplicationShutdown (each opted-in module, failures collected)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sail::prelude::*;
//!
//! struct CacheModule;
//!
//! #[async_trait]
//! impl Module for CacheModule {
//!     async fn initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
//!         ctx.container().register("cache", Cache::default())?;
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl OnApplicationShutdown for CacheModule {
//!     async fn on_application_shutdown(&mut self) -> Result<(), LifecycleError> {
//!         tracing::info!("Flushing cache");
//!         Ok(())
//!     }
//! }
//!
//! app.register_entry(ModuleEntry::new(CacheModule).with_shutdown())?;
//! ```

mod application;
mod error;
mod registry;
mod shutdown;
mod traits;

pub use application::{Application, ApplicationBuilder};
pub use error::{LifecycleError, Result};
pub use registry::{LifecycleState, ModuleRegistry};
pub use shutdown::shutdown_signal;
pub use traits::{OnApplicationBootstrap, OnApplicationShutdown};
