//! Module Registry
//!
//! Holds the registered modules and drives them through
//! `Created -> Initialized -> Bootstrapped -> ShutDown`.

use super::{LifecycleError, Result};
use crate::module::{Module, ModuleContext, ModuleEntry};
use std::collections::HashSet;
use std::fmt;
use tracing::Instrument;

/// Where a [`ModuleRegistry`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Modules may still be registered
    Created,
    /// Every module initialized; bootstrap hooks not yet run
    Initialized,
    /// Every bootstrap hook succeeded
    Bootstrapped,
    /// Shutdown hooks have run
    ShutDown,
    /// An init or bootstrap hook failed; the registry cannot be reused
    Aborted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Bootstrapped => "bootstrapped",
            LifecycleState::ShutDown => "shut down",
            LifecycleState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Ordered collection of modules
///
/// Every phase visits modules in registration order, one at a time.
///
/// - `init_all` stops at the first failing `initialize` or bootstrap hook and
///   returns that error unchanged. Modules that already initialized are not
///   rolled back.
/// - `shutdown_all` runs every shutdown hook even when some fail, then
///   reports all failures together.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ModuleRegistry::new();
/// registry.register(DatabaseModule::new())?;
/// registry.register_entry(ModuleEntry::new(CacheModule::new()).with_shutdown().build())?;
///
/// registry.init_all(&mut ctx).await?;
/// // ... application runs ...
/// registry.shutdown_all().await?;
/// ```
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
    identities: HashSet<usize>,
    state: LifecycleState,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            identities: HashSet::new(),
            state: LifecycleState::Created,
        }
    }

    /// Register a module that only takes part in initialization.
    pub fn register<M: Module + 'static>(&mut self, module: M) -> Result<()> {
        self.register_entry(ModuleEntry::new(module).build())
    }

    /// Register a module with its optional phases.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::DuplicateModule`] when the same shared instance is
    /// already registered, [`LifecycleError::InvalidTransition`] once
    /// `init_all` has been called.
    pub fn register_entry(&mut self, entry: ModuleEntry) -> Result<()> {
        self.expect_state(LifecycleState::Created, "register a module")?;
        if !self.identities.insert(entry.identity) {
            tracing::warn!(module = %entry.name, "Module registered twice");
            return Err(LifecycleError::DuplicateModule {
                module: entry.name,
            });
        }

        tracing::debug!(
            module = %entry.name,
            bootstrap = entry.has_bootstrap(),
            shutdown = entry.has_shutdown(),
            "Module registered"
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Initialize every module, then run every bootstrap hook.
    pub async fn init_all(&mut self, ctx: &mut ModuleContext<'_>) -> Result<()> {
        self.expect_state(LifecycleState::Created, "initialize modules")?;

        if let Err(e) = self.initialize_modules(ctx).await {
            self.state = LifecycleState::Aborted;
            return Err(e);
        }
        self.state = LifecycleState::Initialized;

        if let Err(e) = self.bootstrap_modules().await {
            self.state = LifecycleState::Aborted;
            return Err(e);
        }
        self.state = LifecycleState::Bootstrapped;
        Ok(())
    }

    async fn initialize_modules(&self, ctx: &mut ModuleContext<'_>) -> Result<()> {
        tracing::info!("Initializing modules...");

        for entry in &self.entries {
            let span = tracing::debug_span!("initialize", module = %entry.name);
            async {
                let mut module = entry.module.write().await;
                module.initialize(&mut *ctx).await.inspect_err(|e| {
                    tracing::error!("Initialization failed for {}: {}", entry.name, e);
                })?;
                tracing::debug!("Initialized: {}", entry.name);
                Ok::<_, LifecycleError>(())
            }
            .instrument(span)
            .await?;
        }

        tracing::info!("Modules initialized ({} modules)", self.entries.len());
        Ok(())
    }

    async fn bootstrap_modules(&self) -> Result<()> {
        let mut count = 0;
        for entry in &self.entries {
            let Some(hook) = &entry.bootstrap else {
                continue;
            };
            let mut module = hook.write().await;
            module.on_application_bootstrap().await.inspect_err(|e| {
                tracing::error!("Bootstrap failed for {}: {}", entry.name, e);
            })?;
            tracing::debug!("Bootstrapped: {}", entry.name);
            count += 1;
        }

        tracing::info!("Bootstrap complete ({} hooks executed)", count);
        Ok(())
    }

    /// Run every shutdown hook in registration order.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::ShutdownIncomplete`] with one entry per failing
    /// hook. The registry is `ShutDown` either way.
    pub async fn shutdown_all(&mut self) -> Result<()> {
        self.expect_state(LifecycleState::Bootstrapped, "shut down modules")?;
        tracing::info!("Shutting down modules...");

        let mut failures = Vec::new();
        for entry in &self.entries {
            let Some(hook) = &entry.shutdown else {
                continue;
            };
            let mut module = hook.write().await;
            match module.on_application_shutdown().await {
                Ok(()) => tracing::debug!("Shutdown complete: {}", entry.name),
                Err(e) => {
                    // Keep going, later modules still own resources
                    tracing::error!("Shutdown failed for {}: {}", entry.name, e);
                    failures.push(LifecycleError::hook_failed(&entry.name, e.to_string()));
                }
            }
        }
        self.state = LifecycleState::ShutDown;

        if failures.is_empty() {
            tracing::info!("Module shutdown complete");
            Ok(())
        } else {
            Err(LifecycleError::ShutdownIncomplete(failures))
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Module names in registration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(ModuleEntry::name)
    }

    fn expect_state(&self, expected: LifecycleState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                from: self.state,
                operation,
            })
        }
    }
}
