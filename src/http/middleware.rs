// ============================================================
// Layer 1 — Request Middleware
// ============================================================
// Wraps every request, outermost first:
//
//   1. Resolve a trace id: W3C `traceparent`, else `x-trace-id`,
//      else a fresh 32-hex-digit id. Stored as a request
//      extension for handlers and attached to a tracing span.
//   2. Run the rest of the stack, catching any panic that
//      escapes a handler. A panic is logged with the trace id and
//      answered with a generic 500; its message is never sent.
//   3. Stamp `x-process-time-ms` and `x-trace-id` on the response.

use std::{panic::AssertUnwindSafe, time::Instant};

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::predict_use_case::elapsed_ms;
use crate::http::error::ApiError;
use crate::ml::inferencer::panic_message;

pub const PROCESS_TIME_HEADER: &str = "x-process-time-ms";
pub const TRACE_ID_HEADER: &str = "x-trace-id";
const TRACEPARENT_HEADER: &str = "traceparent";
const MAX_TRACE_ID_LEN: usize = 128;

/// Correlation id for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

pub async fn observe(mut req: Request, next: Next) -> Response {
    let started = Instant::now();
    let trace_id = resolve_trace_id(req.headers());
    let path = req.uri().path().to_string();
    let span = tracing::info_span!(
        "request",
        method = %req.method(),
        path = %path,
        trace_id = %trace_id,
    );
    req.extensions_mut().insert(TraceId(trace_id.clone()));

    let outcome = AssertUnwindSafe(next.run(req))
        .catch_unwind()
        .instrument(span.clone())
        .await;

    let mut resp = match outcome {
        Ok(resp) => resp,
        Err(payload) => {
            span.in_scope(|| {
                tracing::error!(
                    event = "unhandled_exception",
                    trace_id = %trace_id,
                    path = %path,
                    error = %panic_message(payload.as_ref()),
                    "Unhandled error while serving request"
                )
            });
            ApiError::internal(&trace_id).into_response()
        }
    };

    let elapsed = elapsed_ms(started);
    let headers = resp.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&format!("{elapsed:.2}")) {
        headers.insert(HeaderName::from_static(PROCESS_TIME_HEADER), v);
    }
    if let Ok(v) = HeaderValue::from_str(&trace_id) {
        headers.insert(HeaderName::from_static(TRACE_ID_HEADER), v);
    }

    span.in_scope(|| {
        tracing::debug!(status = resp.status().as_u16(), elapsed_ms = elapsed, "request finished")
    });
    resp
}

/// Inherit the caller's trace id when it is well formed, otherwise mint one.
pub fn resolve_trace_id(headers: &HeaderMap) -> String {
    if let Some(id) = header_str(headers, TRACEPARENT_HEADER).and_then(parse_traceparent) {
        return id;
    }
    if let Some(id) = header_str(headers, TRACE_ID_HEADER).filter(|s| is_safe_id(s)) {
        return id.to_string();
    }
    Uuid::new_v4().simple().to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// `00-<32 hex trace id>-<16 hex parent id>-<2 hex flags>`
fn parse_traceparent(value: &str) -> Option<String> {
    let mut parts = value.split('-');
    let (version, trace, parent, flags) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
    let hex = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit());

    if !hex(version, 2) || version == "ff" || !hex(parent, 16) || !hex(flags, 2) {
        return None;
    }
    if !hex(trace, 32) || trace.bytes().all(|b| b == b'0') {
        return None;
    }
    Some(trace.to_ascii_lowercase())
}

fn is_safe_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_TRACE_ID_LEN
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}
