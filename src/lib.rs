//! execgate: sandboxed subprocess execution with streamed output.
//!
//! A request names a program, its arguments and a working directory. The
//! directory must canonicalize into an allowed root, every argument is
//! stripped of shell metacharacters, and the program is spawned directly in
//! its own process group. Output is streamed as tagged, sequenced chunks
//! followed by exactly one terminal result.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod exit_codes;
pub mod gateway;
pub mod logging;
pub mod server;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{GatewayError, Result};
pub use exec::{ExecEvent, ExecutionRequest, ExecutionResult, ExecutionStream, Outcome};
pub use gateway::Gateway;
