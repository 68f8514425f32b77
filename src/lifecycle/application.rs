//! Application Bootstrap
//!
//! Ties the container, router and module registry to an HTTP listener with
//! signal-driven graceful shutdown.

use super::{LifecycleError, ModuleRegistry, shutdown_signal};
use crate::config::{
    ConfigService, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SHUTDOWN_TIMEOUT_SECS, HOST, PORT,
    SHUTDOWN_TIMEOUT_SECS,
};
use crate::di::Container;
use crate::error::{Result, SailError};
use crate::module::{Module, ModuleContext, ModuleEntry};
use crate::router::{Middleware, Router};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A runnable application
///
/// # Example
///
/// ```rust,ignore
/// use sail::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> sail::Result<()> {
///     let mut app = Application::new();
///     app.use_middleware(request_logging());
///     app.register_module(UsersModule::default())?;
///     app.run().await
/// }
/// ```
pub struct Application {
    container: Arc<Container>,
    registry: ModuleRegistry,
    router: Router,
    config: ConfigService,
    shutdown_timeout: Duration,
}

impl Application {
    /// An application with a fresh container and configuration loaded from
    /// the environment and `.env`.
    pub fn new() -> Self {
        ApplicationBuilder::new().build()
    }

    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Register a module that only takes part in initialization.
    pub fn register_module<M: Module + 'static>(&mut self, module: M) -> Result<()> {
        Ok(self.registry.register(module)?)
    }

    /// Register a module together with its optional bootstrap/shutdown phases.
    pub fn register_entry(&mut self, entry: impl Into<ModuleEntry>) -> Result<()> {
        Ok(self.registry.register_entry(entry.into())?)
    }

    /// Add middleware for every route registered afterwards. Call this before
    /// [`run`](Application::run): modules register their routes while they
    /// initialize.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.router.use_middleware(middleware);
        self
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// `HOST:PORT` the listener binds to.
    pub fn listen_addr(&self) -> String {
        format!(
            "{}:{}",
            self.config.get_or(HOST, DEFAULT_HOST),
            self.config.get_or(PORT, DEFAULT_PORT)
        )
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` completes.
    ///
    /// 1. Initialize and bootstrap every module. On failure nothing is bound
    ///    and the error is returned.
    /// 2. Serve HTTP on a background task.
    /// 3. Wait for either a listener error or `shutdown`.
    /// 4. On `shutdown`, stop accepting connections and give in-flight
    ///    requests up to the shutdown timeout before aborting them.
    /// 5. Run module shutdown hooks. Their errors are logged, not returned.
    ///
    /// Returns [`SailError::Listener`] if the listener failed, `Ok(())` after
    /// a requested shutdown.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let mut ctx = ModuleContext::new(&self.container, &mut self.router, &self.config);
        if let Err(e) = self.registry.init_all(&mut ctx).await {
            tracing::error!("Failed to initialize modules: {}", e);
            return Err(e.into());
        }
        self.container.freeze();

        let addr = self.listen_addr();
        let router = std::mem::take(&mut self.router).into_axum();
        let (error_tx, error_rx) = oneshot::channel::<io::Error>();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        tracing::info!(%addr, "Starting server");
        let mut server = tokio::spawn(async move {
            if let Err(e) = serve(&addr, router, stop_rx).await {
                let _ = error_tx.send(e);
            }
        });

        let outcome = tokio::select! {
            received = error_rx => match received {
                Ok(e) => {
                    tracing::error!("Server error: {}", e);
                    Err(SailError::Listener(e))
                }
                Err(_) => {
                    tracing::warn!("Server stopped without an error");
                    Ok(())
                }
            },
            _ = shutdown => {
                tracing::info!("Shutting down server...");
                let _ = stop_tx.send(());
                match tokio::time::timeout(self.shutdown_timeout, &mut server).await {
                    Ok(Ok(())) => tracing::info!("Server stopped gracefully"),
                    Ok(Err(e)) => tracing::error!("Server task failed: {}", e),
                    Err(_) => {
                        let err = drain_timeout(self.shutdown_timeout);
                        tracing::warn!("{}", err);
                        server.abort();
                    }
                }
                Ok(())
            }
        };

        if let Err(e) = self.registry.shutdown_all().await {
            tracing::error!("Error during module shutdown: {}", e);
        }
        tracing::info!("Application stopped");
        outcome
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

fn drain_timeout(limit: Duration) -> LifecycleError {
    LifecycleError::timeout(
        "shutdown",
        format!("in-flight requests still running after {limit:?}, dropping them"),
    )
}

async fn serve(addr: &str, router: axum::Router, stop: oneshot::Receiver<()>) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = stop.await;
        })
        .await
}

/// Builder for Application
pub struct ApplicationBuilder {
    container: Option<Container>,
    config: Option<ConfigService>,
    shutdown_timeout: Option<Duration>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            container: None,
            config: None,
            shutdown_timeout: None,
        }
    }

    /// Use a pre-populated container
    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Use this configuration instead of loading `.env`
    pub fn config(mut self, config: ConfigService) -> Self {
        self.config = Some(config);
        self
    }

    /// Upper bound for in-flight requests after shutdown starts. Defaults
    /// to `SHUTDOWN_TIMEOUT_SECS`, or 5 seconds.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Application {
        let config = self.config.unwrap_or_else(ConfigService::new);
        let shutdown_timeout = self.shutdown_timeout.unwrap_or_else(|| {
            let secs = config.get_int(SHUTDOWN_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS);
            let secs = u64::try_from(secs).unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS as u64);
            Duration::from_secs(secs)
        });

        Application {
            container: Arc::new(self.container.unwrap_or_default()),
            registry: ModuleRegistry::new(),
            router: Router::new(),
            config,
            shutdown_timeout,
        }
    }
}
