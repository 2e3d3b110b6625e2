//! HTTP transport for the gateway.
//!
//! - `POST /exec/stream`: chunked plain-text output plus trailing note
//! - `POST /exec`: buffered JSON response
//! - `GET /health`

pub mod handlers;
pub mod trace;


use crate::gateway::Gateway;
use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::net::SocketAddr;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub gateway: Gateway,
}

pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/exec/stream", post(handlers::exec_stream_handler))
        .route("/exec", post(handlers::exec_collect_handler))
        .route("/health", get(handlers::health_handler))
        .layer(middleware::from_fn(trace::trace_request))
        .with_state(AppState { gateway })
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(gateway: Gateway, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!(%local, roots = ?gateway.policy().roots(), "execgate listening");

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("execgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
