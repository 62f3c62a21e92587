// ============================================================
// Layer 1 — Route Handlers
// ============================================================
// Thin adapters: pull what the use case needs out of the request,
// call it, wrap the result. Status-code decisions live in error.rs.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use crate::application::predict_use_case::PredictionResponse;
use crate::domain::state::Lifecycle;
use crate::http::error::ApiError;
use crate::http::middleware::TraceId;
use crate::http::AppContext;

pub const BANNER: &str = "Iris Species Prediction API is running.";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// 503 body for /ready_check: which side of the load we are on
#[derive(Debug, Serialize)]
pub struct NotReadyResponse {
    pub status: &'static str,
    pub phase: Lifecycle,
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse { message: BANNER })
}

pub async fn live_check(State(ctx): State<AppContext>) -> Response {
    if ctx.state.is_alive() {
        Json(StatusResponse { status: "alive" }).into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(StatusResponse { status: "dead" })).into_response()
    }
}

pub async fn ready_check(State(ctx): State<AppContext>) -> Response {
    if ctx.state.is_ready() {
        Json(StatusResponse { status: "ready" }).into_response()
    } else {
        let body = NotReadyResponse { status: "not_ready", phase: ctx.state.lifecycle() };
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}

/// The body is taken as raw bytes so that malformed JSON is reported
/// through the same field-issue shape as type errors.
pub async fn predict(
    State(ctx): State<AppContext>,
    Extension(TraceId(trace_id)): Extension<TraceId>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ApiError> {
    ctx.predictor
        .execute(&body, &trace_id)
        .map(Json)
        .map_err(|e| ApiError::from_service(e, &trace_id))
}

pub async fn reload(
    State(ctx): State<AppContext>,
    Extension(TraceId(trace_id)): Extension<TraceId>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Some(lifecycle) = ctx.lifecycle else {
        return Err(ApiError::internal(&trace_id));
    };

    // Loading does blocking file and network I/O
    let outcome = tokio::task::spawn_blocking(move || lifecycle.reload())
        .await
        .map_err(|e| {
            tracing::error!(trace_id = %trace_id, "Reload task failed: {e}");
            ApiError::internal(&trace_id)
        })?;

    match outcome {
        Ok(_) => Ok(Json(StatusResponse { status: "ready" })),
        Err(e) => Err(ApiError::reload_failed(&e, &trace_id)),
    }
}
