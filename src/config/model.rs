//! GatewayConfig struct definition and default implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name looked up in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "execgate.yaml";

/// Configuration for the execution gateway.
///
/// This struct represents the contents of `execgate.yaml`. The gateway does
/// not own these values: the embedding deployment supplies them.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    // =========================================================================
    // Sandbox settings
    // =========================================================================
    /// Directories a request's working directory must resolve into.
    /// Canonicalized once at startup; at least one is required.
    #[serde(default)]
    pub allowed_roots: Vec<PathBuf>,

    /// Whether the child inherits the gateway's environment before the
    /// request's own variables are applied.
    #[serde(default = "default_true")]
    pub inherit_env: bool,

    // =========================================================================
    // Timeout settings
    // =========================================================================
    /// Timeout applied when a request does not carry one (0 disables).
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Interval between the graceful termination signal and the forceful kill.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    // =========================================================================
    // Streaming settings
    // =========================================================================
    /// Maximum bytes carried by one output chunk.
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,

    /// Capacity of the bounded outbound event queue per execution.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Optional ceiling on concurrently running child processes.
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    // =========================================================================
    // Server settings
    // =========================================================================
    /// Listen address for `execgate serve`.
    #[serde(default = "default_bind")]
    pub bind: String,
}

// Default value functions for serde
fn default_true() -> bool {
    true
}
fn default_timeout_ms() -> u64 {
    300_000
}
fn default_grace_period_ms() -> u64 {
    5_000
}
fn default_read_chunk_size() -> usize {
    8 * 1024
}
fn default_channel_capacity() -> usize {
    64
}
fn default_bind() -> String {
    "127.0.0.1:8700".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            allowed_roots: Vec::new(),
            inherit_env: default_true(),
            default_timeout_ms: default_timeout_ms(),
            grace_period_ms: default_grace_period_ms(),
            read_chunk_size: default_read_chunk_size(),
            channel_capacity: default_channel_capacity(),
            max_concurrent: None,
            bind: default_bind(),
        }
    }
}
