//! Implementation of the `execgate run` command.
//!
//! Streams the child's stdout and stderr to the matching local streams as
//! chunks arrive. Ctrl-C cancels the execution (graceful → forceful on the
//! whole process group) and exits 130.

use super::request_from_args;
use crate::cli::ExecArgs;
use crate::error::{GatewayError, Result};
use crate::exec::{ExecEvent, StreamSource, render_note};
use crate::gateway::Gateway;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Exit status after an interrupt, as a shell reports SIGINT.
const INTERRUPTED: i32 = 130;

pub async fn cmd_run(gateway: &Gateway, args: ExecArgs) -> Result<i32> {
    let request = request_from_args(args)?;
    let accepted = gateway.accept(&request)?;
    let mut stream = gateway.launch(accepted);

    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    let mut at_line_start = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = stream.next() => match event {
                Some(ExecEvent::Chunk(chunk)) => {
                    if let Some(&last) = chunk.bytes.last() {
                        at_line_start = last == b'\n';
                    }
                    match chunk.source {
                        StreamSource::Stdout => write_all(&mut stdout, &chunk.bytes).await?,
                        StreamSource::Stderr => write_all(&mut stderr, &chunk.bytes).await?,
                    }
                }
                Some(ExecEvent::Finished(result)) => {
                    if let Some(note) = render_note(&result, at_line_start) {
                        write_all(&mut stderr, note.as_bytes()).await?;
                    }
                    return Ok(result.process_exit_code());
                }
                None => return Ok(crate::exit_codes::RUNTIME_FAILURE),
            },
            _ = &mut ctrl_c => {
                tracing::info!("interrupted, cancelling execution");
                stream.cancel().await;
                return Ok(INTERRUPTED);
            }
        }
    }
}

async fn write_all<W: AsyncWrite + Unpin>(out: &mut W, bytes: &[u8]) -> Result<()> {
    let written = async {
        out.write_all(bytes).await?;
        out.flush().await
    };
    written
        .await
        .map_err(|e| GatewayError::UserError(format!("failed to write output: {}", e)))
}
