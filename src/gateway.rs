//! The gateway facade: validation, supervision and admission in one handle.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::exec::{
    CollectedOutput, DirectLauncher, ExecEvent, ExecutionRequest, ExecutionResult,
    ExecutionStream, Launcher, SupervisorSettings, TerminationPolicy, collect_events, supervise,
};
use crate::validate::{self, AcceptedRequest, SandboxPolicy};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

/// Runs execution requests inside a sandbox policy.
///
/// Cheap to clone; clones share the policy, the launcher and the
/// concurrency limit.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

struct Inner {
    policy: SandboxPolicy,
    settings: SupervisorSettings,
    channel_capacity: usize,
    default_timeout_ms: u64,
    launcher: Arc<dyn Launcher>,
    permits: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("roots", &self.inner.policy.roots())
            .field("settings", &self.inner.settings)
            .field("default_timeout_ms", &self.inner.default_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Build a gateway that spawns processes directly.
    ///
    /// Fails if the configuration is invalid or an allowed root cannot be
    /// canonicalized.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let launcher = DirectLauncher {
            inherit_env: config.inherit_env,
        };
        Self::with_launcher(config, launcher)
    }

    /// Build a gateway around a custom [`Launcher`].
    pub fn with_launcher(config: &GatewayConfig, launcher: impl Launcher) -> Result<Self> {
        config.validate()?;
        let policy = SandboxPolicy::new(&config.allowed_roots)?;

        Ok(Self {
            inner: Arc::new(Inner {
                policy,
                settings: SupervisorSettings {
                    termination: TerminationPolicy::new(config.grace_period()),
                    chunk_size: config.read_chunk_size,
                },
                channel_capacity: config.channel_capacity,
                default_timeout_ms: config.default_timeout_ms,
                launcher: Arc::new(launcher),
                permits: config.max_concurrent.map(|n| Arc::new(Semaphore::new(n))),
            }),
        })
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.inner.policy
    }

    /// Validate a request without running it.
    pub fn accept(&self, request: &ExecutionRequest) -> Result<AcceptedRequest> {
        let accepted = validate::accept(request, &self.inner.policy, self.inner.default_timeout_ms);
        match &accepted {
            Ok(accepted) => debug!(
                command = %accepted.display_command(),
                cwd = %accepted.working_directory().display(),
                "request accepted"
            ),
            Err(e) => warn!(command = %request.command, error = %e, "request rejected"),
        }
        accepted
    }

    /// [`accept`](Self::accept) on tokio's blocking pool.
    ///
    /// Resolving the working directory touches the filesystem, which may be
    /// slow (network mounts); async callers use this so a runtime worker is
    /// never blocked on it.
    pub async fn admit(&self, request: ExecutionRequest) -> Result<AcceptedRequest> {
        let gateway = self.clone();
        match tokio::task::spawn_blocking(move || gateway.accept(&request)).await {
            Ok(accepted) => accepted,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(GatewayError::Internal(format!(
                "request validation did not finish: {}",
                e
            ))),
        }
    }

    /// Start supervising an accepted request.
    ///
    /// Must be called from within a tokio runtime. With `max_concurrent`
    /// set, the process is spawned once a permit is free; a consumer that
    /// goes away while waiting never spawns anything.
    pub fn launch(&self, accepted: AcceptedRequest) -> ExecutionStream {
        let (tx, rx) = mpsc::channel(self.inner.channel_capacity);
        let launcher = Arc::clone(&self.inner.launcher);
        let settings = self.inner.settings;
        let permits = self.inner.permits.clone();

        let supervisor = tokio::spawn(async move {
            let _permit = match permits {
                Some(permits) => {
                    let acquired = tokio::select! {
                        permit = permits.acquire_owned() => permit.ok(),
                        _ = tx.closed() => {
                            info!(
                                command = %accepted.display_command(),
                                "consumer left before a permit was free"
                            );
                            return;
                        }
                    };
                    if acquired.is_none() {
                        let result = ExecutionResult::rejected("gateway is shutting down");
                        let _ = tx.send(ExecEvent::Finished(result)).await;
                        return;
                    }
                    acquired
                }
                None => None,
            };
            supervise(accepted, launcher, settings, tx).await;
        });

        ExecutionStream::new(rx, supervisor)
    }

    /// Validate and run `request`.
    ///
    /// A rejected request yields a stream whose only item is a zero-duration
    /// `RuntimeError` result describing the rejection.
    pub fn stream(&self, request: &ExecutionRequest) -> ExecutionStream {
        match self.accept(request) {
            Ok(accepted) => self.launch(accepted),
            Err(e) => ExecutionStream::rejected(ExecutionResult::rejected(e.to_string())),
        }
    }

    /// Run `request` to completion and buffer its output.
    ///
    /// Rejections are returned as errors before anything runs.
    pub async fn collect(&self, request: &ExecutionRequest) -> Result<CollectedOutput> {
        let accepted = self.admit(request.clone()).await?;
        Ok(collect_events(self.launch(accepted)).await)
    }
}
