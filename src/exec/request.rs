//! Inbound execution request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A caller's request to run one command.
///
/// Field names follow the JSON transport (`workingDirectory`, `timeoutMs`),
/// with kebab-case aliases accepted for callers that use the
/// `command-name` / `argument-list` / `working-directory` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// Executable to run. Resolved through `PATH`, never through a shell.
    #[serde(alias = "command-name")]
    pub command: String,

    /// Argument vector, passed through the sanitizer before spawn.
    #[serde(default, alias = "argument-list")]
    pub args: Vec<String>,

    /// Requested working directory; must resolve into an allowed root.
    #[serde(alias = "working-directory", alias = "cwd")]
    pub working_directory: String,

    /// Wall-clock budget in milliseconds. `0` disables the timeout;
    /// absent means the gateway's configured default.
    #[serde(default, alias = "timeout-ms", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Extra environment variables for the child.
    #[serde(default, alias = "environment", skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl ExecutionRequest {
    /// Create a request with no arguments, default timeout and no extra environment.
    pub fn new(command: impl Into<String>, working_directory: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_directory: working_directory.into(),
            timeout_ms: None,
            env: BTreeMap::new(),
        }
    }

    /// Set the argument vector.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set an explicit timeout (`0` disables).
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Add one environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Render the command line for logs, quoted the way a POSIX shell would read it.
    pub fn display_command(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.command.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}
