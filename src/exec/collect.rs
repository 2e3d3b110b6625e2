//! Buffering adapter for callers that want the whole result at once.

use super::chunk::{ExecEvent, StreamSource};
use super::outcome::{ExecutionResult, Outcome};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Everything an execution produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedOutput {
    /// Both pipes, concatenated in arrival order.
    pub combined: Vec<u8>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub result: ExecutionResult,
}

impl CollectedOutput {
    pub fn exit_code(&self) -> Option<i32> {
        self.result.exit_code()
    }

    /// The synchronous transport's response body.
    pub fn to_response(&self) -> CollectResponse {
        CollectResponse {
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            exit_code: self.result.exit_code(),
            outcome: self.result.outcome.clone(),
            duration_ms: self.result.duration_ms,
            timeout_elapsed: self.result.timeout_elapsed,
        }
    }
}

/// `{ stdout, stderr, exitCode, outcome, durationMs, timeoutElapsed? }`; `exitCode` is null
/// unless the process exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// Set when the timeout fired, including a process that then exited
    /// within the grace period.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub timeout_elapsed: bool,
}

/// Drain `events` to its terminal record.
pub async fn collect_events<S>(mut events: S) -> CollectedOutput
where
    S: Stream<Item = ExecEvent> + Unpin,
{
    let mut combined = Vec::new();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    while let Some(event) = events.next().await {
        match event {
            ExecEvent::Chunk(chunk) => {
                combined.extend_from_slice(&chunk.bytes);
                match chunk.source {
                    StreamSource::Stdout => stdout.extend_from_slice(&chunk.bytes),
                    StreamSource::Stderr => stderr.extend_from_slice(&chunk.bytes),
                }
            }
            ExecEvent::Finished(result) => {
                return CollectedOutput {
                    combined,
                    stdout,
                    stderr,
                    result,
                };
            }
        }
    }

    CollectedOutput {
        combined,
        stdout,
        stderr,
        result: ExecutionResult::rejected("execution ended without a terminal result"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::chunk::OutputChunk;
    use bytes::Bytes;
    use std::time::Duration;

    fn chunk(source: StreamSource, data: &'static str, sequence: u64) -> ExecEvent {
        ExecEvent::Chunk(OutputChunk {
            source,
            bytes: Bytes::from_static(data.as_bytes()),
            sequence,
        })
    }

    #[tokio::test]
    async fn test_collects_per_source_and_combined() {
        let events = futures::stream::iter(vec![
            chunk(StreamSource::Stdout, "out1 ", 0),
            chunk(StreamSource::Stderr, "err1 ", 0),
            chunk(StreamSource::Stdout, "out2", 1),
            ExecEvent::Finished(ExecutionResult::new(
                Outcome::Completed { exit_code: 1 },
                Duration::from_millis(3),
                None,
            )),
        ]);

        let collected = collect_events(events).await;
        assert_eq!(collected.combined, b"out1 err1 out2");
        assert_eq!(collected.stdout, b"out1 out2");
        assert_eq!(collected.stderr, b"err1 ");
        assert_eq!(collected.exit_code(), Some(1));
    }

    #[tokio::test]
    async fn test_partial_output_with_null_exit_code() {
        let events = futures::stream::iter(vec![
            chunk(StreamSource::Stdout, "tick\n", 0),
            ExecEvent::Finished(ExecutionResult::new(
                Outcome::TimedOut { timeout_ms: 100 },
                Duration::from_millis(160),
                None,
            )),
        ]);

        let response = collect_events(events).await.to_response();
        assert_eq!(response.stdout, "tick\n");
        assert_eq!(response.exit_code, None);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["exitCode"].is_null());
        assert_eq!(json["outcome"]["kind"], "timed_out");
        assert_eq!(json["durationMs"], 160);
    }

    #[tokio::test]
    async fn test_stream_without_result() {
        let events = futures::stream::iter(vec![chunk(StreamSource::Stdout, "x", 0)]);
        let collected = collect_events(events).await;
        assert_eq!(collected.combined, b"x");
        assert!(matches!(collected.result.outcome, Outcome::RuntimeError { .. }));
    }
}
