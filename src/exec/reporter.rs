//! Human-readable rendering of a terminal result for byte-stream transports.

use super::outcome::{ExecutionResult, Outcome};

/// The trailing note for a streamed execution, or `None` when the process
/// exited 0.
///
/// `at_line_start` tells whether the output so far ended with a newline
/// (or was empty); if not, the note starts on a fresh line.
pub fn render_note(result: &ExecutionResult, at_line_start: bool) -> Option<String> {
    let mut text = note_text(&result.outcome)?;
    if result.timeout_elapsed && matches!(result.outcome, Outcome::Completed { .. }) {
        text.push_str(" after the timeout elapsed");
    }
    let lead = if at_line_start { "" } else { "\n" };
    Some(format!("{}[{}]\n", lead, text))
}

fn note_text(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Completed { exit_code: 0 } => None,
        Outcome::Completed { exit_code } if *exit_code < 0 => {
            Some(format!("process terminated by signal {}", -exit_code))
        }
        Outcome::Completed { exit_code } => Some(format!("process exited with code {}", exit_code)),
        Outcome::TimedOut { timeout_ms } => Some(format!(
            "process timed out after {} ms and was killed",
            timeout_ms
        )),
        Outcome::SpawnFailed { reason } => Some(format!("failed to start process: {}", reason)),
        Outcome::RuntimeError { reason } => Some(format!("execution error: {}", reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(outcome: Outcome) -> ExecutionResult {
        ExecutionResult::new(outcome, Duration::from_millis(1), None)
    }

    #[test]
    fn test_success_has_no_note() {
        assert_eq!(render_note(&result(Outcome::Completed { exit_code: 0 }), true), None);
        assert_eq!(render_note(&result(Outcome::Completed { exit_code: 0 }), false), None);
    }

    #[test]
    fn test_notes() {
        assert_eq!(
            render_note(&result(Outcome::Completed { exit_code: 2 }), true).as_deref(),
            Some("[process exited with code 2]\n")
        );
        assert_eq!(
            render_note(&result(Outcome::Completed { exit_code: -9 }), true).as_deref(),
            Some("[process terminated by signal 9]\n")
        );
        assert_eq!(
            render_note(&result(Outcome::TimedOut { timeout_ms: 100 }), true).as_deref(),
            Some("[process timed out after 100 ms and was killed]\n")
        );
        assert_eq!(
            render_note(
                &result(Outcome::SpawnFailed {
                    reason: "nope: No such file or directory (os error 2)".into()
                }),
                true
            )
            .as_deref(),
            Some("[failed to start process: nope: No such file or directory (os error 2)]\n")
        );
        assert_eq!(
            render_note(
                &result(Outcome::RuntimeError {
                    reason: "failed to read stdout: boom".into()
                }),
                true
            )
            .as_deref(),
            Some("[execution error: failed to read stdout: boom]\n")
        );
    }

    #[test]
    fn test_exit_after_timeout_is_marked() {
        let terminated = result(Outcome::Completed { exit_code: -15 }).with_timeout_elapsed(true);
        assert_eq!(
            render_note(&terminated, true).as_deref(),
            Some("[process terminated by signal 15 after the timeout elapsed]\n")
        );

        let trapped = result(Outcome::Completed { exit_code: 143 }).with_timeout_elapsed(true);
        assert_eq!(
            render_note(&trapped, true).as_deref(),
            Some("[process exited with code 143 after the timeout elapsed]\n")
        );

        let killed = result(Outcome::TimedOut { timeout_ms: 100 }).with_timeout_elapsed(true);
        assert_eq!(
            render_note(&killed, true).as_deref(),
            Some("[process timed out after 100 ms and was killed]\n")
        );
    }

    #[test]
    fn test_note_starts_on_fresh_line() {
        assert_eq!(
            render_note(&result(Outcome::Completed { exit_code: 1 }), false).as_deref(),
            Some("\n[process exited with code 1]\n")
        );
    }
}
