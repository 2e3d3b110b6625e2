//! Request tracing middleware
//!
//! Wraps each request in a root span carrying a request id.

use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, info_span};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

pub async fn trace_request(request: Request, next: Next) -> Response {
    let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    let span = info_span!(
        parent: None,
        "http",
        id,
        method = %request.method(),
        path = %request.uri().path()
    );

    async move {
        let response = next.run(request).await;
        tracing::debug!(status = response.status().as_u16(), "response started");
        response
    }
    .instrument(span)
    .await
}
