//! Process execution for execgate.
//!
//! - `request`: the inbound request shape
//! - `launcher`: the process-creation seam
//! - `supervisor` + `state` + `termination`: lifecycle, timeout and escalation
//! - `multiplexer`: per-pipe readers
//! - `stream` + `reporter`: the consumer side and its trailing note
//! - `collect`: the buffering adapter

pub mod chunk;
pub mod collect;
pub mod launcher;
pub mod multiplexer;
pub mod outcome;
pub mod reporter;
pub mod request;
pub mod state;
pub mod stream;
pub mod supervisor;
pub mod termination;


pub use chunk::{ExecEvent, OutputChunk, StreamSource};
pub use collect::{CollectResponse, CollectedOutput, collect_events};
pub use launcher::{DirectLauncher, LaunchedProcess, Launcher, OutputPipe};
pub use outcome::{ExecutionResult, Outcome};
pub use reporter::render_note;
pub use request::ExecutionRequest;
pub use state::{ExecutionHandle, ExecutionState, StopCause, TerminationStage};
pub use stream::ExecutionStream;
pub use supervisor::{SupervisorSettings, supervise};
pub use termination::{TerminationPolicy, TerminationSignal, signal_process_group};
