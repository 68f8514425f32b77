use crate::error::{Result, SailError};
use dashmap::DashMap;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;

pub const PORT: &str = "PORT";
pub const HOST: &str = "HOST";
pub const SHUTDOWN_TIMEOUT_SECS: &str = "SHUTDOWN_TIMEOUT_SECS";

pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: i64 = 5;

/// Configuration service
///
/// Lookups resolve in this order: values set with [`set`](ConfigService::set),
/// then non-empty process environment variables, then values read from a
/// `.env` file, then the caller's default. Loading a `.env` file never
/// touches the process environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    overrides: Arc<DashMap<String, String>>,
    file_values: Arc<HashMap<String, String>>,
}

impl ConfigService {
    /// Load `.env` from the working directory if it exists.
    pub fn new() -> Self {
        match Self::from_env_file(".env") {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
                Self::empty()
            }
        }
    }

    /// A service backed only by overrides and the process environment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load values from a dotenv-style file. A missing file yields an empty
    /// file layer; a malformed one is an error.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Ok(Self::empty()),
            Err(e) => return Err(config_error(path, e)),
        };

        let mut file_values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| config_error(path, e))?;
            file_values.insert(key, value);
        }
        tracing::debug!(path = %path.display(), entries = file_values.len(), "Loaded env file");

        Ok(Self {
            overrides: Arc::default(),
            file_values: Arc::new(file_values),
        })
    }

    pub fn set(&self, key: &str, value: &str) {
        self.overrides.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.clone());
        }
        if let Ok(value) = env::var(key) {
            if !value.is_empty() {
                return Some(value);
            }
        }
        self.file_values.get(key).cloned()
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|value| parse_bool(value.trim()))
            .unwrap_or(default)
    }
}

/// Accepts `1`, `t`, `true` and `0`, `f`, `false` in lower, upper or title
/// case. Anything else, `yes`/`no` included, is not a boolean.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn config_error(path: &Path, e: dotenvy::Error) -> SailError {
    SailError::Config {
        key: path.display().to_string(),
        message: e.to_string(),
    }
}
