//! Request acceptance: the hard gate in front of the process supervisor.
//!
//! [`AcceptedRequest`] can only be built by [`accept`], so holding one is
//! proof that the working directory was canonicalized into an allowed root
//! and that every argument went through the sanitizer.

use super::args::{contains_metacharacters, sanitize_args};
use super::workdir::SandboxPolicy;
use crate::error::{GatewayError, Result};
use crate::exec::ExecutionRequest;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static ENV_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid env name regex"));

/// A request that passed validation and may be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedRequest {
    program: String,
    args: Vec<String>,
    working_directory: PathBuf,
    env: BTreeMap<String, String>,
    timeout: Option<Duration>,
    display: String,
}

impl AcceptedRequest {
    /// Executable name or path, exactly as requested.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Sanitized argument vector.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Canonical working directory inside an allowed root.
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Extra environment for the child.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Effective wall-clock budget; `None` means no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Command line for logs (pre-sanitization, shell-quoted).
    pub fn display_command(&self) -> &str {
        &self.display
    }
}

/// Validate `request` against `policy`.
///
/// Malformed requests fail with [`GatewayError::InvalidRequest`]; a working
/// directory outside the sandbox fails with
/// [`GatewayError::SandboxViolation`]. Neither has any process side effect.
/// A request without a timeout gets `default_timeout_ms` (0 disables).
pub fn accept(
    request: &ExecutionRequest,
    policy: &SandboxPolicy,
    default_timeout_ms: u64,
) -> Result<AcceptedRequest> {
    check_command(&request.command)?;

    if let Some(index) = request.args.iter().position(|arg| arg.contains('\0')) {
        return Err(GatewayError::InvalidRequest(format!(
            "argument {} contains a NUL byte",
            index
        )));
    }

    for (key, value) in &request.env {
        if !ENV_NAME_REGEX.is_match(key) {
            return Err(GatewayError::InvalidRequest(format!(
                "environment variable name '{}' is invalid (expected [A-Za-z_][A-Za-z0-9_]*)",
                key
            )));
        }
        if value.contains('\0') {
            return Err(GatewayError::InvalidRequest(format!(
                "environment variable '{}' contains a NUL byte",
                key
            )));
        }
    }

    let working_directory = policy.resolve(&request.working_directory)?;

    let timeout_ms = request.timeout_ms.unwrap_or(default_timeout_ms);
    let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

    Ok(AcceptedRequest {
        program: request.command.clone(),
        args: sanitize_args(&request.args),
        working_directory,
        env: request.env.clone(),
        timeout,
        display: request.display_command(),
    })
}

/// The program name is never sanitized; it is rejected outright when it
/// looks like shell syntax rather than an executable.
fn check_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("command is empty".to_string()));
    }
    if command.contains('\0') {
        return Err(GatewayError::InvalidRequest(
            "command contains a NUL byte".to_string(),
        ));
    }
    if contains_metacharacters(command) || command.chars().any(char::is_whitespace) {
        return Err(GatewayError::InvalidRequest(format!(
            "command '{}' must be a single executable name or path, not shell syntax",
            command
        )));
    }
    Ok(())
}
