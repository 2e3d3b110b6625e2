//! The process-creation seam.

use crate::validate::AcceptedRequest;
use std::io;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

/// A readable output pipe of a launched process.
pub type OutputPipe = Box<dyn AsyncRead + Send + Unpin>;

/// A spawned child plus the pipes the supervisor reads its output from.
pub struct LaunchedProcess {
    pub child: Child,
    pub stdout: Option<OutputPipe>,
    pub stderr: Option<OutputPipe>,
}

impl LaunchedProcess {
    /// Take the child's own stdout and stderr pipes.
    pub fn new(mut child: Child) -> Self {
        let stdout = child.stdout.take().map(|pipe| Box::new(pipe) as OutputPipe);
        let stderr = child.stderr.take().map(|pipe| Box::new(pipe) as OutputPipe);
        Self {
            child,
            stdout,
            stderr,
        }
    }
}

impl std::fmt::Debug for LaunchedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchedProcess")
            .field("pid", &self.child.id())
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish()
    }
}

/// Creates the child process for an accepted request.
///
/// On unix the child must be the leader of its own process group (its pid
/// is used as the group id when signalling).
pub trait Launcher: Send + Sync + 'static {
    fn launch(&self, request: &AcceptedRequest) -> io::Result<LaunchedProcess>;
}

/// Spawns the program directly with `execvp` semantics. No shell is involved.
#[derive(Debug, Clone, Copy)]
pub struct DirectLauncher {
    /// Layer the request environment over the gateway's own environment;
    /// when false the child sees only the request environment.
    pub inherit_env: bool,
}

impl Default for DirectLauncher {
    fn default() -> Self {
        Self { inherit_env: true }
    }
}

impl Launcher for DirectLauncher {
    fn launch(&self, request: &AcceptedRequest) -> io::Result<LaunchedProcess> {
        let mut command = Command::new(request.program());
        command
            .args(request.args())
            .current_dir(request.working_directory())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if !self.inherit_env {
            command.env_clear();
        }
        command.envs(request.env());

        #[cfg(unix)]
        command.process_group(0);

        command.spawn().map(LaunchedProcess::new)
    }
}
