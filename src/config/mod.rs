//! Configuration model for execgate.
//!
//! This module defines the `GatewayConfig` struct that represents
//! `execgate.yaml`. It supports forward-compatible YAML parsing (unknown
//! fields are ignored), sensible defaults for optional fields, and
//! validation of config values.

mod model;
mod operations;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{DEFAULT_CONFIG_FILE, GatewayConfig};
