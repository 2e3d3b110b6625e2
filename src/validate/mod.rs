//! Validation module for execgate.
//!
//! Everything here runs before a process exists:
//! - Working-directory sandbox: canonical containment in an allowed root
//! - Argument sanitization: shell metacharacters stripped from every token
//! - Request acceptance: malformed-request checks plus the two above

pub mod args;
pub mod request;
pub mod workdir;

pub use args::{SHELL_METACHARACTERS, contains_metacharacters, sanitize_arg, sanitize_args};
pub use request::{AcceptedRequest, accept};
pub use workdir::SandboxPolicy;
