//! HTTP handlers for the execution transports.

use super::AppState;
use crate::error::GatewayError;
use crate::exec::{CollectResponse, ExecutionRequest};
use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(code: StatusCode, message: &str) -> Response {
    (
        code,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// 403 for a sandbox violation, 500 if the gateway itself failed, 400 otherwise.
fn rejection_response(err: &GatewayError) -> Response {
    let code = if err.is_sandbox_violation() {
        StatusCode::FORBIDDEN
    } else if matches!(err, GatewayError::Internal(_)) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    error_response(code, &err.to_string())
}

fn parse_request(
    body: Result<Json<ExecutionRequest>, JsonRejection>,
) -> Result<ExecutionRequest, Response> {
    body.map(|Json(request)| request).map_err(|rejection| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("invalid request body: {}", rejection.body_text()),
        )
    })
}

/// `POST /exec/stream`: combined output as a chunked `text/plain` body,
/// followed by a note line unless the process exited 0.
pub async fn exec_stream_handler(
    State(state): State<AppState>,
    body: Result<Json<ExecutionRequest>, JsonRejection>,
) -> Response {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let accepted = match state.gateway.admit(request).await {
        Ok(accepted) => accepted,
        Err(e) => return rejection_response(&e),
    };

    let bytes = state
        .gateway
        .launch(accepted)
        .into_byte_stream()
        .map(Ok::<_, Infallible>);

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(bytes),
    )
        .into_response()
}

/// `POST /exec`: run to completion and answer with the buffered output.
pub async fn exec_collect_handler(
    State(state): State<AppState>,
    body: Result<Json<ExecutionRequest>, JsonRejection>,
) -> Response {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state.gateway.collect(&request).await {
        Ok(collected) => Json::<CollectResponse>(collected.to_response()).into_response(),
        Err(e) => rejection_response(&e),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
