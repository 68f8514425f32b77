//! Lifecycle-specific error types

use crate::error::SailError;
use thiserror::Error;

/// Errors that can occur during lifecycle operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Module initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Module bootstrap failed
    #[error("Bootstrap failed: {0}")]
    BootstrapFailed(String),

    /// Shutdown operation failed
    #[error("Shutdown failed: {0}")]
    ShutdownFailed(String),

    /// Operation timed out
    #[error("Timeout during {phase}: {message}")]
    Timeout {
        /// The lifecycle phase where timeout occurred
        phase: String,
        /// Additional error message
        message: String,
    },

    /// Hook execution failed
    #[error("Hook execution failed for {module}: {message}")]
    HookFailed {
        /// Name of the module that failed
        module: String,
        /// Error message
        message: String,
    },

    /// The registry was asked to do something its current state forbids
    #[error("Cannot {operation} while registry is {from}")]
    InvalidTransition {
        from: super::LifecycleState,
        operation: &'static str,
    },

    /// The same module instance was registered twice
    #[error("Module already registered: {module}")]
    DuplicateModule { module: String },

    /// A framework operation (routing, container) failed inside a hook
    #[error(transparent)]
    Framework(Box<SailError>),

    /// One or more shutdown hooks failed; every hook was still invoked
    #[error("{} shutdown hook(s) failed: {}", .0.len(), join(.0))]
    ShutdownIncomplete(Vec<LifecycleError>),
}

fn join(errors: &[LifecycleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LifecycleError {
    /// Create an initialization failure error
    pub fn init_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create a bootstrap failure error
    pub fn bootstrap_failed(msg: impl Into<String>) -> Self {
        Self::BootstrapFailed(msg.into())
    }

    /// Create a shutdown failure error
    pub fn shutdown_failed(msg: impl Into<String>) -> Self {
        Self::ShutdownFailed(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            phase: phase.into(),
            message: message.into(),
        }
    }

    /// Create a hook failure error
    pub fn hook_failed(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HookFailed {
            module: module.into(),
            message: message.into(),
        }
    }
}

impl From<SailError> for LifecycleError {
    fn from(err: SailError) -> Self {
        match err {
            SailError::Lifecycle(inner) => inner,
            other => Self::Framework(Box::new(other)),
        }
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;
