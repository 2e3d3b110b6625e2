//! Pipe readers feeding the supervisor.
//!
//! Each of the child's output pipes gets its own reader task. A reader
//! emits one [`OutputChunk`] per successful read, numbered per source,
//! and finishes with exactly one `Closed` or `Failed` event.

use super::chunk::{OutputChunk, StreamSource};
use bytes::Bytes;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What a reader reports to the supervisor.
#[derive(Debug)]
pub enum PipeEvent {
    Chunk(OutputChunk),
    Closed(StreamSource),
    Failed(StreamSource, io::Error),
}

/// Spawn a task that reads `pipe` until EOF in reads of at most
/// `chunk_size` bytes.
///
/// The reader waits for the supervisor to take each event, so a slow
/// consumer holds back the pipe (and eventually the child) instead of
/// growing a buffer. If the supervisor goes away the reader keeps
/// draining to EOF and discards what it reads.
pub fn spawn_reader<R>(
    pipe: R,
    source: StreamSource,
    chunk_size: usize,
    events: mpsc::Sender<PipeEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(read_pipe(pipe, source, chunk_size.max(1), events))
}

async fn read_pipe<R>(
    mut pipe: R,
    source: StreamSource,
    chunk_size: usize,
    events: mpsc::Sender<PipeEvent>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; chunk_size];
    let mut sequence = 0u64;
    let mut detached = false;

    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => {
                if !detached {
                    let _ = events.send(PipeEvent::Closed(source)).await;
                }
                return;
            }
            Ok(n) => {
                if detached {
                    continue;
                }
                let chunk = OutputChunk {
                    source,
                    bytes: Bytes::copy_from_slice(&buf[..n]),
                    sequence,
                };
                sequence += 1;
                if events.send(PipeEvent::Chunk(chunk)).await.is_err() {
                    tracing::trace!(%source, "supervisor gone, draining pipe");
                    detached = true;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                if !detached {
                    let _ = events.send(PipeEvent::Failed(source, e)).await;
                }
                return;
            }
        }
    }
}
