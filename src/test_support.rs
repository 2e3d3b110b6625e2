use crate::config::GatewayConfig;
use crate::exec::{DirectLauncher, LaunchedProcess, Launcher};
use crate::validate::AcceptedRequest;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tempfile::TempDir;
use tokio::io::{AsyncRead, ReadBuf};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// A [`DirectLauncher`] that counts how often it was asked to spawn.
#[derive(Debug, Default, Clone)]
pub(crate) struct CountingLauncher {
    inner: DirectLauncher,
    launches: Arc<AtomicUsize>,
}

impl CountingLauncher {
    pub(crate) fn count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl Launcher for CountingLauncher {
    fn launch(&self, request: &AcceptedRequest) -> io::Result<LaunchedProcess> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.inner.launch(request)
    }
}

/// Spawns the real process but hands the supervisor a stdout that yields
/// `partial` once and then fails with `device gone`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BrokenStdoutLauncher;

impl Launcher for BrokenStdoutLauncher {
    fn launch(&self, request: &AcceptedRequest) -> io::Result<LaunchedProcess> {
        let mut launched = DirectLauncher::default().launch(request)?;
        launched.stdout = Some(Box::new(BrokenPipe { served: false }));
        Ok(launched)
    }
}

struct BrokenPipe {
    served: bool,
}

impl AsyncRead for BrokenPipe {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.served {
            return Poll::Ready(Err(io::Error::other("device gone")));
        }
        self.served = true;
        buf.put_slice(b"partial");
        Poll::Ready(Ok(()))
    }
}

/// A temporary sandbox root plus a config that allows only it.
///
/// Timeouts are off and the grace period is short so tests that do time
/// out finish quickly.
pub(crate) fn sandbox() -> (TempDir, GatewayConfig) {
    let temp_dir = TempDir::new().unwrap();
    let config = GatewayConfig {
        allowed_roots: vec![temp_dir.path().to_path_buf()],
        default_timeout_ms: 0,
        grace_period_ms: 50,
        ..GatewayConfig::default()
    };
    (temp_dir, config)
}

/// Write a shell script into `dir` and return its path, for tests that
/// need shell syntax the argument sanitizer would strip.
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}
