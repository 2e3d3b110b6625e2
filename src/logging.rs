//! Tracing configuration for execgate.
//!
//! Supports:
//! - Verbosity: default (WARN), `-v` (INFO), `-vv` (DEBUG), `-q` (ERROR)
//! - Pretty, JSON or compact output on stderr
//! - `RUST_LOG` when no verbosity flag was given

use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Log output format
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Colored human-readable output
    #[default]
    Pretty,
    /// Structured JSON output (one JSON object per line)
    Json,
    /// Compact single-line format
    Compact,
}

/// Tracing configuration built from CLI args
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Number of `-v` flags
    pub verbose: u8,
    /// ERROR only
    pub quiet: bool,
    pub format: LogFormat,
}

impl TracingConfig {
    /// Level for the terminal layer.
    pub fn level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                _ => Level::DEBUG,
            }
        }
    }

    fn cli_specified(&self) -> bool {
        self.quiet || self.verbose > 0
    }

    /// CLI flags win over `RUST_LOG`.
    fn filter(&self) -> EnvFilter {
        let directive = default_directive(self.level());
        if self.cli_specified() {
            EnvFilter::new(directive)
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
        }
    }
}

fn default_directive(level: Level) -> String {
    format!("execgate={},warn", level.as_str().to_lowercase())
}

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn make_terminal_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer {
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

/// Initialize tracing once; later calls are ignored.
pub fn init_tracing(config: &TracingConfig) {
    if TRACING_INITIALIZED.set(()).is_err() {
        return;
    }

    let layer = make_terminal_layer(config.format, config.filter());
    // A subscriber installed elsewhere (e.g. by an embedding binary) wins.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_default() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn test_levels() {
        let mut config = TracingConfig::default();
        assert_eq!(config.level(), Level::WARN);

        config.verbose = 1;
        assert_eq!(config.level(), Level::INFO);

        config.verbose = 3;
        assert_eq!(config.level(), Level::DEBUG);

        config.quiet = true;
        assert_eq!(config.level(), Level::ERROR);
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(Level::INFO), "execgate=info,warn");
    }
}
