// ============================================================
// Layer 1 — HTTP Error Mapping
// ============================================================
// The one place where failures become status codes:
//
//   ServiceError::Validation → 422  {"detail": [field issues], "trace_id"}
//   ServiceError::NotReady   → 503  {"detail": "Model not loaded...", ...}
//   ServiceError::Inference  → 500  {"detail": "Prediction failed", ...}
//   panic / join failure     → 500  {"detail": "Internal Server Error", ...}
//   reload failure           → 503  {"detail": "...", "kind": "fetch_error", ...}
//
// Internal error text is logged elsewhere and never copied into
// a response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::errors::{FieldIssue, LoadError, ServiceError};

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Detail {
    Message(&'static str),
    Issues(Vec<FieldIssue>),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: Detail,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    trace_id: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, detail: Detail, trace_id: &str) -> Self {
        Self {
            status,
            body: ErrorBody { detail, kind: None, trace_id: trace_id.to_string() },
        }
    }

    pub fn from_service(err: ServiceError, trace_id: &str) -> Self {
        match err {
            ServiceError::Validation(v) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, Detail::Issues(v.issues), trace_id)
            }
            ServiceError::NotReady => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                Detail::Message("Model not loaded. Try again later."),
                trace_id,
            ),
            ServiceError::Inference(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                Detail::Message("Prediction failed"),
                trace_id,
            ),
        }
    }

    pub fn internal(trace_id: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Detail::Message("Internal Server Error"),
            trace_id,
        )
    }

    pub fn reload_failed(err: &LoadError, trace_id: &str) -> Self {
        let mut e = Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            Detail::Message("Model reload failed"),
            trace_id,
        );
        e.body.kind = Some(err.kind());
        e
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{PredictError, ValidationError};

    fn body_of(e: ApiError) -> serde_json::Value {
        serde_json::to_value(&e.body).unwrap()
    }

    #[test]
    fn test_status_codes() {
        let v = ValidationError { issues: vec![FieldIssue::new("sepal_length", "missing", "Field required")] };
        assert_eq!(ApiError::from_service(v.into(), "t").status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::from_service(ServiceError::NotReady, "t").status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::from_service(PredictError::Model("x".into()).into(), "t").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_inference_error_hides_internal_text() {
        let err = ServiceError::Inference(PredictError::Model("secret stack detail".into()));
        let body = body_of(ApiError::from_service(err, "abc"));
        assert_eq!(body["detail"], "Prediction failed");
        assert_eq!(body["trace_id"], "abc");
        assert!(!body.to_string().contains("secret"));
    }

    #[test]
    fn test_reload_failure_names_kind() {
        let e = LoadError::Credential { path: "key.json".into(), reason: "file not found".into() };
        let body = body_of(ApiError::reload_failed(&e, "t"));
        assert_eq!(body["kind"], "credential_error");
        assert!(!body.to_string().contains("key.json"));
    }
}
