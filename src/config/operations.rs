//! Config loading, validation, and utility operations.

use super::model::{DEFAULT_CONFIG_FILE, GatewayConfig};
use crate::error::{GatewayError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

impl GatewayConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the execgate.yaml file
    ///
    /// # Returns
    ///
    /// * `Ok(GatewayConfig)` - Successfully parsed config
    /// * `Err(GatewayError::Config)` - Read or parse error
    ///
    /// Validation is deferred to [`GatewayConfig::validate`] so that CLI
    /// `--allow-root` flags can be merged in first.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to null; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(yaml)
            .map_err(|e| GatewayError::Config(format!("failed to parse config YAML: {}", e)))
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GatewayError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Resolve the config to use.
    ///
    /// An explicit path must exist. Without one, `execgate.yaml` in the
    /// current directory is used when present, otherwise defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "loading config from current directory");
            return Self::load(&local);
        }

        Ok(Self::default())
    }

    /// Append roots supplied outside the config file (e.g. `--allow-root`).
    pub fn with_extra_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        for root in roots {
            if !self.allowed_roots.contains(&root) {
                self.allowed_roots.push(root);
            }
        }
        self
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - at least one `allowed_roots` entry
    /// - `grace_period_ms`, `read_chunk_size`, `channel_capacity` must be positive
    /// - `max_concurrent`, when set, must be positive
    /// - `bind` must parse as a socket address
    pub fn validate(&self) -> Result<()> {
        if self.allowed_roots.is_empty() {
            return Err(GatewayError::Config(
                "no allowed_roots configured; add one to the config file or pass --allow-root"
                    .to_string(),
            ));
        }

        if self.grace_period_ms == 0 {
            return Err(GatewayError::Config(
                "config validation failed: grace_period_ms must be greater than 0".to_string(),
            ));
        }

        if self.read_chunk_size == 0 {
            return Err(GatewayError::Config(
                "config validation failed: read_chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(GatewayError::Config(
                "config validation failed: channel_capacity must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent == Some(0) {
            return Err(GatewayError::Config(
                "config validation failed: max_concurrent must be greater than 0 when set"
                    .to_string(),
            ));
        }

        match self.max_concurrent {
            Some(n) if n > Semaphore::MAX_PERMITS => {
                return Err(GatewayError::Config(format!(
                    "config validation failed: max_concurrent {} exceeds the limit of {}",
                    n,
                    Semaphore::MAX_PERMITS
                )));
            }
            _ => {}
        }

        if self.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(GatewayError::Config(format!(
                "config validation failed: bind '{}' is not a socket address (e.g. 127.0.0.1:8700)",
                self.bind
            )));
        }

        Ok(())
    }

    /// Grace period as a `Duration`.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}
