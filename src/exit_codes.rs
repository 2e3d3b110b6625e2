//! Exit code constants for the execgate CLI.
//!
//! When a command runs to completion the CLI exits with the child's own
//! status. Every other outcome maps to one of these codes:
//! - 0: Success
//! - 2: User error (bad args, malformed request, bad config)
//! - 70: Runtime failure after spawn (pipe read error, lost supervisor)
//! - 77: Sandbox violation (working directory outside allowed roots)
//! - 124: Timed out and killed
//! - 127: Process could not be spawned

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, malformed request, or invalid configuration.
pub const USER_ERROR: i32 = 2;

/// Runtime failure: the process started but the execution could not be observed to completion.
pub const RUNTIME_FAILURE: i32 = 70;

/// Sandbox violation: the requested working directory is outside every allowed root.
pub const SANDBOX_VIOLATION: i32 = 77;

/// Timed out: the process exceeded its wall-clock budget and was killed.
pub const TIMED_OUT: i32 = 124;

/// Spawn failure: executable missing, permission denied, or resource limits.
pub const SPAWN_FAILURE: i32 = 127;
