//! # Sail
//!
//! A minimal application framework for small HTTP services, built on axum.
//!
//! Sail borrows NestJS' structure: an application is a list of modules, each
//! module wires its services into a shared [`Container`] and its controllers
//! into a shared [`Router`], and the [`Application`] drives every module
//! through a startup and teardown lifecycle around a gracefully stopping
//! HTTP server.
//!
//! ## Features
//!
//! - **Provider Container**: named and type-keyed providers, frozen once the server starts
//! - **Onion Middleware**: first registered middleware is the outermost wrapper
//! - **Module Lifecycle**: fail-fast init/bootstrap, best-effort shutdown
//! - **Graceful Shutdown**: SIGINT/SIGTERM stop the listener with a bounded drain
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sail::prelude::*;
//! use axum::routing::get;
//!
//! struct HelloModule;
//!
//! #[async_trait]
//! impl Module for HelloModule {
//!     async fn initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
//!         ctx.router().handle("/hello", get(|| async { "hello" }))?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> sail::Result<()> {
//!     sail::logging::init().ok();
//!
//!     let mut app = Application::new();
//!     app.use_middleware(request_logging());
//!     app.register_module(HelloModule)?;
//!     app.run().await
//! }
//! ```

pub mod common;
pub mod config;
pub mod controller;
pub mod di;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod module;
pub mod router;

// Re-export core types
pub use common::ApiResponse;
pub use config::ConfigService;
pub use controller::Controller;
pub use di::Container;
pub use error::{Result, SailError};
pub use lifecycle::{Application, ApplicationBuilder, LifecycleError, ModuleRegistry};
pub use module::{Module, ModuleContext, ModuleEntry};
pub use router::{Middleware, Router};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use sail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::ApiResponse;
    pub use crate::config::ConfigService;
    pub use crate::controller::Controller;
    pub use crate::di::Container;
    pub use crate::error::SailError;
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, LifecycleError, LifecycleState, ModuleRegistry,
        OnApplicationBootstrap, OnApplicationShutdown, shutdown_signal,
    };
    pub use crate::module::{Module, ModuleBuilder, ModuleContext, ModuleEntry};
    pub use crate::router::{Middleware, Router, request_id, request_logging};
    pub use async_trait::async_trait;
    pub use axum::{
        Json,
        extract::{Path, Query},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
