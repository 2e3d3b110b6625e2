//! Process-group signalling for the graceful → forceful escalation.

use std::io;
use std::time::Duration;

/// Default SIGTERM → SIGKILL interval.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(5000);

/// The two escalation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// SIGTERM: ask the group to exit.
    Graceful,
    /// SIGKILL: cannot be caught or ignored.
    Forceful,
}

impl TerminationSignal {
    pub fn name(self) -> &'static str {
        match self {
            TerminationSignal::Graceful => "SIGTERM",
            TerminationSignal::Forceful => "SIGKILL",
        }
    }
}

/// How long a signalled process group gets before it is killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    pub grace_period: Duration,
}

impl TerminationPolicy {
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

/// Send `signal` to the process group `pgid`.
///
/// A group that no longer exists is not an error, so repeated calls
/// (including after the child was reaped) are no-ops.
#[cfg(unix)]
pub fn signal_process_group(pgid: u32, signal: TerminationSignal) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let raw = i32::try_from(pgid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "process group id out of range"))?;
    if raw <= 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "refusing to signal a non-positive process group",
        ));
    }

    let sig = match signal {
        TerminationSignal::Graceful => Signal::SIGTERM,
        TerminationSignal::Forceful => Signal::SIGKILL,
    };

    match killpg(Pid::from_raw(raw), sig) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

#[cfg(not(unix))]
pub fn signal_process_group(_pgid: u32, _signal: TerminationSignal) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "process group signalling requires a unix platform",
    ))
}
