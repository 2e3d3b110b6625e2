//! Process supervisor.
//!
//! One task per execution. The child's exit, both pipe readers and the
//! timeout/grace timers all fan into a single `select!` loop, which is the
//! only writer of the outbound event channel. The loop ends once the child
//! has been reaped and both pipes are closed; then exactly one
//! [`ExecEvent::Finished`] is sent.

use super::chunk::{ExecEvent, OutputChunk, StreamSource};
use super::launcher::{LaunchedProcess, Launcher};
use super::multiplexer::{PipeEvent, spawn_reader};
use super::outcome::{ExecutionResult, Outcome};
use super::state::{DeadlineAction, ExecutionHandle, StopCause};
use super::termination::{TerminationPolicy, TerminationSignal, signal_process_group};
use crate::validate::AcceptedRequest;
use chrono::Utc;
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// Pipe events buffered between the readers and the supervisor.
const PIPE_QUEUE: usize = 4;

/// Knobs shared by every execution of a gateway.
#[derive(Debug, Clone, Copy)]
pub struct SupervisorSettings {
    pub termination: TerminationPolicy,
    pub chunk_size: usize,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            termination: TerminationPolicy::default(),
            chunk_size: 8192,
        }
    }
}

/// Run `request` to completion, writing its events to `outbound`.
///
/// If `outbound`'s receiver is dropped or closed before the process ends,
/// the process group goes through the same graceful → forceful sequence
/// as a timeout and no further events are sent.
pub async fn supervise(
    request: AcceptedRequest,
    launcher: Arc<dyn Launcher>,
    settings: SupervisorSettings,
    outbound: mpsc::Sender<ExecEvent>,
) {
    let mut handle = ExecutionHandle::new(request.timeout(), settings.termination.grace_period);
    let attempted = Instant::now();

    let LaunchedProcess {
        mut child,
        stdout,
        stderr,
    } = match launcher.launch(&request) {
        Ok(launched) => launched,
        Err(e) => {
            handle.spawn_failed();
            warn!(command = %request.display_command(), error = %e, "failed to spawn process");
            let outcome = Outcome::SpawnFailed {
                reason: format!("{}: {}", request.program(), e),
            };
            let result = ExecutionResult::new(outcome, attempted.elapsed(), None);
            let _ = outbound.send(ExecEvent::Finished(result)).await;
            return;
        }
    };

    let started_at = Utc::now();
    let started = Instant::now();
    handle.start(started, child.id());
    let pid = handle.pid();
    info!(
        pid,
        command = %request.display_command(),
        cwd = %request.working_directory().display(),
        timeout_ms = request.timeout().map(|t| t.as_millis() as u64),
        "process spawned"
    );

    let (pipe_tx, mut pipe_rx) = mpsc::channel(PIPE_QUEUE);
    let mut open_pipes = 0usize;
    if let Some(stdout) = stdout {
        spawn_reader(stdout, StreamSource::Stdout, settings.chunk_size, pipe_tx.clone());
        open_pipes += 1;
    }
    if let Some(stderr) = stderr {
        spawn_reader(stderr, StreamSource::Stderr, settings.chunk_size, pipe_tx.clone());
        open_pipes += 1;
    }
    drop(pipe_tx);

    let mut exit: Option<Result<i32, String>> = None;
    let mut pending: Option<OutputChunk> = None;
    let mut consumer_gone = false;
    let mut read_error: Option<String> = None;

    while exit.is_none() || open_pipes > 0 || pending.is_some() {
        let deadline = handle.next_deadline();

        tokio::select! {
            status = child.wait(), if exit.is_none() => {
                let status = status
                    .map(exit_code_of)
                    .map_err(|e| format!("failed to wait for process: {}", e));
                debug!(
                    pid,
                    status = ?status,
                    state = %handle.state(),
                    "process exited"
                );
                exit = Some(status);
            }

            event = pipe_rx.recv(), if open_pipes > 0 && pending.is_none() => match event {
                Some(PipeEvent::Chunk(chunk)) => {
                    if !consumer_gone {
                        pending = Some(chunk);
                    }
                }
                Some(PipeEvent::Closed(source)) => {
                    debug!(pid, %source, "pipe closed");
                    open_pipes = open_pipes.saturating_sub(1);
                }
                Some(PipeEvent::Failed(source, e)) => {
                    warn!(pid, %source, error = %e, "pipe read failed");
                    open_pipes = open_pipes.saturating_sub(1);
                    read_error
                        .get_or_insert_with(|| format!("failed to read {}: {}", source, e));
                }
                None => open_pipes = 0,
            },

            permit = outbound.reserve(), if pending.is_some() => match permit {
                Ok(permit) => {
                    if let Some(chunk) = pending.take() {
                        permit.send(ExecEvent::Chunk(chunk));
                    }
                }
                Err(_) => {
                    pending = None;
                    consumer_gone = true;
                    if exit.is_none() || open_pipes > 0 {
                        on_disconnect(&mut handle);
                    }
                }
            },

            _ = outbound.closed(), if !consumer_gone => {
                pending = None;
                consumer_gone = true;
                if exit.is_none() || open_pipes > 0 {
                    on_disconnect(&mut handle);
                }
            }

            _ = sleep_until(deadline.unwrap_or(started)), if deadline.is_some() => {
                match handle.on_deadline(Instant::now()) {
                    Some(DeadlineAction::Signal(signal)) => {
                        if signal == TerminationSignal::Graceful {
                            info!(
                                pid,
                                state = %handle.state(),
                                "timeout elapsed, terminating process group"
                            );
                        }
                        send_signal(handle.pid(), signal);
                    }
                    Some(DeadlineAction::StopDraining) => {
                        warn!(
                            pid,
                            "pipes still open after kill, abandoning remaining output"
                        );
                        open_pipes = 0;
                    }
                    None => {}
                }
            }
        }
    }

    // Readers still blocked on a send are released here.
    drop(pipe_rx);

    let exit = exit.unwrap_or_else(|| Err("process exit status unavailable".to_string()));
    let outcome = handle.conclude(exit, read_error);
    let result = ExecutionResult::new(outcome, started.elapsed(), Some(started_at))
        .with_timeout_elapsed(handle.stop_cause() == Some(StopCause::Timeout));
    info!(
        pid,
        outcome = %result.outcome,
        duration_ms = result.duration_ms,
        "execution finished"
    );

    if !consumer_gone {
        let _ = outbound.send(ExecEvent::Finished(result)).await;
    }
}

fn on_disconnect(handle: &mut ExecutionHandle) {
    if let Some(signal) = handle.begin_termination(StopCause::Disconnected, Instant::now()) {
        info!(pid = handle.pid(), "consumer disconnected, terminating process group");
        send_signal(handle.pid(), signal);
    }
}

fn send_signal(pgid: Option<u32>, signal: TerminationSignal) {
    let Some(pgid) = pgid else {
        return;
    };
    match signal_process_group(pgid, signal) {
        Ok(()) => info!(pgid, signal = signal.name(), "signal sent"),
        Err(e) => warn!(
            pgid,
            signal = signal.name(),
            error = %e,
            "failed to signal process group"
        ),
    }
}

/// Exit code of a reaped child; death by signal `N` is reported as `-N`.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
