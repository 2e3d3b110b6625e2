//! The supervisor's execution state machine.
//!
//! `Pending → Running → {Completed | TimedOut(Terminated) | TimedOut(Killed) | SpawnFailed}`
//!
//! [`ExecutionHandle`] only decides; it never touches a process. The
//! supervisor feeds it the clock and the events it observes and carries
//! out whatever signal a transition asks for.

use super::outcome::Outcome;
use super::termination::TerminationSignal;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Why the supervisor started terminating the process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The wall-clock budget ran out.
    Timeout,
    /// The consumer of the stream went away.
    Disconnected,
}

/// Escalation step reached while terminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStage {
    /// SIGTERM sent; waiting out the grace period.
    Terminated,
    /// SIGKILL sent.
    Killed,
}

/// Observable state of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Pending,
    Running,
    TimedOut(TerminationStage),
    Disconnected(TerminationStage),
    Completed,
    SpawnFailed,
    Failed,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionState::Pending => f.write_str("pending"),
            ExecutionState::Running => f.write_str("running"),
            ExecutionState::TimedOut(TerminationStage::Terminated) => {
                f.write_str("timed-out(terminated)")
            }
            ExecutionState::TimedOut(TerminationStage::Killed) => f.write_str("timed-out(killed)"),
            ExecutionState::Disconnected(TerminationStage::Terminated) => {
                f.write_str("disconnected(terminated)")
            }
            ExecutionState::Disconnected(TerminationStage::Killed) => {
                f.write_str("disconnected(killed)")
            }
            ExecutionState::Completed => f.write_str("completed"),
            ExecutionState::SpawnFailed => f.write_str("spawn-failed"),
            ExecutionState::Failed => f.write_str("failed"),
        }
    }
}

/// What the supervisor must do when the current deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineAction {
    Signal(TerminationSignal),
    /// The group was killed a grace period ago and the pipes are still
    /// open (a descendant escaped the group); stop waiting for EOF.
    StopDraining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Terminating {
        cause: StopCause,
        grace_deadline: Instant,
    },
    Killed {
        cause: StopCause,
        drain_deadline: Instant,
    },
    Drained {
        cause: StopCause,
    },
    SpawnFailed,
    Concluded(ExecutionState),
}

/// Per-execution bookkeeping for timeout and termination.
#[derive(Debug, Clone)]
pub struct ExecutionHandle {
    timeout: Option<Duration>,
    grace: Duration,
    pid: Option<u32>,
    started: Option<Instant>,
    cause: Option<StopCause>,
    phase: Phase,
}

impl ExecutionHandle {
    pub fn new(timeout: Option<Duration>, grace: Duration) -> Self {
        Self {
            timeout,
            grace,
            pid: None,
            started: None,
            cause: None,
            phase: Phase::Pending,
        }
    }

    /// The process exists; the timeout clock starts now.
    pub fn start(&mut self, now: Instant, pid: Option<u32>) {
        if self.phase == Phase::Pending {
            self.pid = pid;
            self.started = Some(now);
            self.phase = Phase::Running;
        }
    }

    pub fn spawn_failed(&mut self) {
        if self.phase == Phase::Pending {
            self.phase = Phase::SpawnFailed;
        }
    }

    /// Process id (and process group id) of the child, once started.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Why termination began, if it did. Survives [`conclude`](Self::conclude).
    pub fn stop_cause(&self) -> Option<StopCause> {
        self.cause
    }

    pub fn state(&self) -> ExecutionState {
        let staged = |cause: StopCause, stage| match cause {
            StopCause::Timeout => ExecutionState::TimedOut(stage),
            StopCause::Disconnected => ExecutionState::Disconnected(stage),
        };
        match self.phase {
            Phase::Pending => ExecutionState::Pending,
            Phase::Running => ExecutionState::Running,
            Phase::Terminating { cause, .. } => staged(cause, TerminationStage::Terminated),
            Phase::Killed { cause, .. } | Phase::Drained { cause } => {
                staged(cause, TerminationStage::Killed)
            }
            Phase::SpawnFailed => ExecutionState::SpawnFailed,
            Phase::Concluded(state) => state,
        }
    }

    /// The instant at which [`on_deadline`](Self::on_deadline) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Running => Some(self.started? + self.timeout?),
            Phase::Terminating { grace_deadline, .. } => Some(grace_deadline),
            Phase::Killed { drain_deadline, .. } => Some(drain_deadline),
            _ => None,
        }
    }

    /// Start the graceful → forceful sequence.
    ///
    /// Only a running execution changes state; a later cause never
    /// replaces the first one.
    pub fn begin_termination(
        &mut self,
        cause: StopCause,
        now: Instant,
    ) -> Option<TerminationSignal> {
        if self.phase != Phase::Running {
            return None;
        }
        self.cause = Some(cause);
        self.phase = Phase::Terminating {
            cause,
            grace_deadline: now + self.grace,
        };
        Some(TerminationSignal::Graceful)
    }

    /// Advance the escalation if the current deadline has passed.
    pub fn on_deadline(&mut self, now: Instant) -> Option<DeadlineAction> {
        match self.next_deadline() {
            Some(deadline) if now >= deadline => {}
            _ => return None,
        }
        match self.phase {
            Phase::Running => self
                .begin_termination(StopCause::Timeout, now)
                .map(DeadlineAction::Signal),
            Phase::Terminating { cause, .. } => {
                self.phase = Phase::Killed {
                    cause,
                    drain_deadline: now + self.grace,
                };
                Some(DeadlineAction::Signal(TerminationSignal::Forceful))
            }
            Phase::Killed { cause, .. } => {
                self.phase = Phase::Drained { cause };
                Some(DeadlineAction::StopDraining)
            }
            _ => None,
        }
    }

    /// Decide the terminal outcome once the process has been reaped and
    /// the pipes are done.
    ///
    /// `exit` is the exit code (or the wait failure); `read_error` is the
    /// first pipe failure, if any.
    pub fn conclude(&mut self, exit: Result<i32, String>, read_error: Option<String>) -> Outcome {
        let killed_by = match self.phase {
            Phase::Killed { cause, .. } | Phase::Drained { cause } => Some(cause),
            _ => None,
        };
        let disconnected = matches!(
            self.phase,
            Phase::Terminating {
                cause: StopCause::Disconnected,
                ..
            }
        ) || killed_by == Some(StopCause::Disconnected);

        let (state, outcome) = if killed_by == Some(StopCause::Timeout) {
            let timeout_ms = self
                .timeout
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0);
            (
                ExecutionState::TimedOut(TerminationStage::Killed),
                Outcome::TimedOut { timeout_ms },
            )
        } else if disconnected {
            (
                self.state(),
                Outcome::RuntimeError {
                    reason: "caller disconnected before the process finished".to_string(),
                },
            )
        } else if let Some(reason) = read_error {
            (ExecutionState::Failed, Outcome::RuntimeError { reason })
        } else {
            match exit {
                Ok(exit_code) => (ExecutionState::Completed, Outcome::Completed { exit_code }),
                Err(reason) => (ExecutionState::Failed, Outcome::RuntimeError { reason }),
            }
        };

        self.phase = Phase::Concluded(state);
        outcome
    }
}
