//! Terminal execution results.

use crate::exit_codes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How an execution ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The process exited. A process ended by signal `N` reports `-N`.
    Completed { exit_code: i32 },
    /// The wall-clock budget ran out, the grace period elapsed, and the
    /// process group was killed.
    TimedOut { timeout_ms: u64 },
    /// The process could not be created.
    SpawnFailed { reason: String },
    /// Rejection before spawn, a pipe read failure, or a lost caller.
    RuntimeError { reason: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed { exit_code } if *exit_code < 0 => {
                write!(f, "terminated by signal {}", -exit_code)
            }
            Outcome::Completed { exit_code } => write!(f, "exited with code {}", exit_code),
            Outcome::TimedOut { timeout_ms } => {
                write!(f, "timed out after {} ms and was killed", timeout_ms)
            }
            Outcome::SpawnFailed { reason } => write!(f, "failed to start: {}", reason),
            Outcome::RuntimeError { reason } => write!(f, "execution error: {}", reason),
        }
    }
}

/// The single terminal record of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// When the process was spawned; absent if it never was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// The wall-clock budget ran out and the group was signalled, even if
    /// the process then exited on its own within the grace period.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub timeout_elapsed: bool,
}

impl ExecutionResult {
    pub fn new(outcome: Outcome, duration: Duration, started_at: Option<DateTime<Utc>>) -> Self {
        Self {
            outcome,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            started_at,
            timeout_elapsed: false,
        }
    }

    pub fn with_timeout_elapsed(mut self, timeout_elapsed: bool) -> Self {
        self.timeout_elapsed = timeout_elapsed;
        self
    }

    /// The zero-duration record for a request that never reached the supervisor.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::RuntimeError {
                reason: reason.into(),
            },
            duration_ms: 0,
            started_at: None,
            timeout_elapsed: false,
        }
    }

    /// The child's exit code, only when it actually exited.
    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            Outcome::Completed { exit_code } => Some(exit_code),
            _ => None,
        }
    }

    /// Exited with status 0.
    pub fn is_success(&self) -> bool {
        self.exit_code() == Some(0)
    }

    /// Process exit status for a CLI that fronts this execution.
    ///
    /// Completed runs pass the child's code through (signals map to
    /// `128 + N` like a shell); other outcomes use [`exit_codes`].
    pub fn process_exit_code(&self) -> i32 {
        match &self.outcome {
            Outcome::Completed { exit_code } if *exit_code < 0 => 128 + (-exit_code).min(127),
            Outcome::Completed { exit_code } => *exit_code & 0xff,
            Outcome::TimedOut { .. } => exit_codes::TIMED_OUT,
            Outcome::SpawnFailed { .. } => exit_codes::SPAWN_FAILURE,
            Outcome::RuntimeError { .. } => exit_codes::RUNTIME_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_only_for_completed() {
        let done = ExecutionResult::new(
            Outcome::Completed { exit_code: 3 },
            Duration::from_millis(12),
            Some(Utc::now()),
        );
        assert_eq!(done.exit_code(), Some(3));
        assert!(!done.is_success());
        assert_eq!(done.duration_ms, 12);

        let timed_out = ExecutionResult::new(
            Outcome::TimedOut { timeout_ms: 100 },
            Duration::from_millis(150),
            None,
        );
        assert_eq!(timed_out.exit_code(), None);
    }

    #[test]
    fn test_rejected_is_zero_duration_runtime_error() {
        let result = ExecutionResult::rejected("sandbox violation: '/etc'");
        assert_eq!(result.duration_ms, 0);
        assert!(result.started_at.is_none());
        assert!(matches!(result.outcome, Outcome::RuntimeError { .. }));
    }

    #[test]
    fn test_process_exit_code_mapping() {
        let of = |outcome| ExecutionResult::new(outcome, Duration::ZERO, None).process_exit_code();

        assert_eq!(of(Outcome::Completed { exit_code: 0 }), 0);
        assert_eq!(of(Outcome::Completed { exit_code: 42 }), 42);
        assert_eq!(of(Outcome::Completed { exit_code: -9 }), 137);
        assert_eq!(of(Outcome::TimedOut { timeout_ms: 1 }), exit_codes::TIMED_OUT);
        assert_eq!(
            of(Outcome::SpawnFailed { reason: "x".into() }),
            exit_codes::SPAWN_FAILURE
        );
        assert_eq!(
            of(Outcome::RuntimeError { reason: "x".into() }),
            exit_codes::RUNTIME_FAILURE
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            Outcome::Completed { exit_code: 1 }.to_string(),
            "exited with code 1"
        );
        assert_eq!(
            Outcome::Completed { exit_code: -15 }.to_string(),
            "terminated by signal 15"
        );
        assert_eq!(
            Outcome::TimedOut { timeout_ms: 100 }.to_string(),
            "timed out after 100 ms and was killed"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let result = ExecutionResult::new(
            Outcome::Completed { exit_code: 0 },
            Duration::from_millis(5),
            None,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"]["kind"], "completed");
        assert_eq!(json["outcome"]["exit_code"], 0);
        assert_eq!(json["durationMs"], 5);
        assert!(json.get("startedAt").is_none());
        assert!(json.get("timeoutElapsed").is_none());

        let json = serde_json::to_value(result.with_timeout_elapsed(true)).unwrap();
        assert_eq!(json["timeoutElapsed"], true);
    }
}
