//! The consumer side of an execution.

use super::chunk::ExecEvent;
use super::outcome::ExecutionResult;
use super::reporter::render_note;
use bytes::Bytes;
use futures::{Stream, StreamExt, future};
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Output chunks followed by exactly one [`ExecEvent::Finished`].
///
/// Dropping the stream before the end counts as a disconnect: the
/// supervisor terminates the process group and reaps it in the background.
#[derive(Debug)]
pub struct ExecutionStream {
    events: mpsc::Receiver<ExecEvent>,
    supervisor: Option<JoinHandle<()>>,
    finished: bool,
}

impl ExecutionStream {
    pub(crate) fn new(events: mpsc::Receiver<ExecEvent>, supervisor: JoinHandle<()>) -> Self {
        Self {
            events,
            supervisor: Some(supervisor),
            finished: false,
        }
    }

    /// A stream with no output whose only item is `result`.
    pub fn rejected(result: ExecutionResult) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(ExecEvent::Finished(result));
        Self {
            events: rx,
            supervisor: None,
            finished: false,
        }
    }

    /// Stop consuming, terminate the process group and wait until the
    /// supervisor has reaped the child.
    pub async fn cancel(mut self) {
        self.events.close();
        if let Some(supervisor) = self.supervisor.take() {
            if let Err(e) = supervisor.await {
                tracing::warn!(error = %e, "supervisor task failed");
            }
        }
    }

    /// Combined output in arrival order, followed by the rendered note
    /// when the process did not exit 0.
    pub fn into_byte_stream(self) -> impl Stream<Item = Bytes> + Send + 'static {
        let mut at_line_start = true;
        self.filter_map(move |event| {
            let bytes = match event {
                ExecEvent::Chunk(chunk) => {
                    if let Some(&last) = chunk.bytes.last() {
                        at_line_start = last == b'\n';
                    }
                    Some(chunk.bytes)
                }
                ExecEvent::Finished(result) => render_note(&result, at_line_start).map(Bytes::from),
            };
            future::ready(bytes)
        })
    }
}

impl Stream for ExecutionStream {
    type Item = ExecEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ExecEvent>> {
        if self.finished {
            return Poll::Ready(None);
        }
        let event = match ready!(self.events.poll_recv(cx)) {
            Some(event) => event,
            None => ExecEvent::Finished(ExecutionResult::rejected(
                "execution ended without a terminal result",
            )),
        };
        if matches!(event, ExecEvent::Finished(_)) {
            self.finished = true;
        }
        Poll::Ready(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::chunk::{OutputChunk, StreamSource};
    use crate::exec::outcome::Outcome;
    use std::time::Duration;

    fn chunk(data: &'static [u8], sequence: u64) -> ExecEvent {
        ExecEvent::Chunk(OutputChunk {
            source: StreamSource::Stdout,
            bytes: Bytes::from_static(data),
            sequence,
        })
    }

    fn finished(outcome: Outcome) -> ExecEvent {
        ExecEvent::Finished(ExecutionResult::new(outcome, Duration::ZERO, None))
    }

    fn stream_of(events: Vec<ExecEvent>) -> ExecutionStream {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event).unwrap();
        }
        drop(tx);
        let supervisor = tokio::spawn(async {});
        ExecutionStream::new(rx, supervisor)
    }

    #[tokio::test]
    async fn test_rejected_yields_single_result() {
        let events: Vec<ExecEvent> = ExecutionStream::rejected(ExecutionResult::rejected("denied"))
            .collect()
            .await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ExecEvent::Finished(r) if matches!(&r.outcome, Outcome::RuntimeError { reason } if reason == "denied")
        ));
    }

    #[tokio::test]
    async fn test_missing_terminal_record_is_synthesized() {
        let events: Vec<ExecEvent> = stream_of(vec![chunk(b"partial", 0)]).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1].as_result().map(|r| &r.outcome),
            Some(Outcome::RuntimeError { .. })
        ));
    }

    #[tokio::test]
    async fn test_nothing_after_terminal_record() {
        let events: Vec<ExecEvent> = stream_of(vec![
            finished(Outcome::Completed { exit_code: 0 }),
            chunk(b"late", 0),
        ])
        .collect()
        .await;
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_byte_stream_appends_note() {
        let bytes: Vec<Bytes> = stream_of(vec![
            chunk(b"no newline", 0),
            finished(Outcome::Completed { exit_code: 4 }),
        ])
        .into_byte_stream()
        .collect()
        .await;
        let text: Vec<u8> = bytes.concat();
        assert_eq!(text, b"no newline\n[process exited with code 4]\n");
    }

    #[tokio::test]
    async fn test_byte_stream_success_is_output_only() {
        let bytes: Vec<Bytes> = stream_of(vec![
            chunk(b"hello\n", 0),
            finished(Outcome::Completed { exit_code: 0 }),
        ])
        .into_byte_stream()
        .collect()
        .await;
        assert_eq!(bytes.concat(), b"hello\n");
    }
}
