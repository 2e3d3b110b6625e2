//! Output chunks and the events carried by an execution stream.

use super::outcome::ExecutionResult;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which pipe a chunk was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::Stdout => f.write_str("stdout"),
            StreamSource::Stderr => f.write_str("stderr"),
        }
    }
}

/// One read from one of the child's output pipes.
///
/// `sequence` starts at 0 and increases by exactly one per chunk for a
/// given source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub source: StreamSource,
    pub bytes: Bytes,
    pub sequence: u64,
}

/// An item of an execution stream.
///
/// A stream yields any number of `Chunk`s followed by exactly one
/// `Finished`, after which it ends.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecEvent {
    Chunk(OutputChunk),
    Finished(ExecutionResult),
}

impl ExecEvent {
    /// The terminal result, if this is the final event.
    pub fn as_result(&self) -> Option<&ExecutionResult> {
        match self {
            ExecEvent::Finished(result) => Some(result),
            ExecEvent::Chunk(_) => None,
        }
    }
}
