// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Request-time failures:
//   ValidationError → client sent a malformed body      (422)
//   NotReady        → no model installed                (503)
//   PredictError    → the model itself failed            (500)
//
// Startup-time failures (LoadError) are never returned to a
// caller; they are logged and leave the service Degraded.

use std::{io, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

// ─── Input validation ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("field '{field}' must be a finite number")]
    NotFinite { field: String },
}

/// One problem with one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Location of the problem, e.g. ["body", "sepal_length"]
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldIssue {
    pub fn new(field: &str, kind: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// Issue about the body as a whole (not valid JSON, not an object)
    pub fn body(kind: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request body failed validation ({} issue(s))", issues.len())]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl From<FeatureError> for ValidationError {
    fn from(e: FeatureError) -> Self {
        match &e {
            FeatureError::NotFinite { field } => ValidationError {
                issues: vec![FieldIssue::new(field, "finite_number", e.to_string())],
            },
        }
    }
}

// ─── Model invocation ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("model returned no prediction")]
    EmptyOutput,

    #[error("model panicked: {0}")]
    Panicked(String),

    #[error("model failed: {0}")]
    Model(String),
}

// ─── Remote storage ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object '{0}' not found")]
    NotFound(String),

    #[error("storage returned HTTP {status} for '{key}'")]
    Status { key: String, status: u16 },

    #[error("storage request failed: {0}")]
    Request(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

// ─── Startup loading ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("credential file '{}' is unusable: {reason}", path.display())]
    Credential { path: PathBuf, reason: String },

    #[error("cannot fetch '{key}' from bucket '{bucket}': {source}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("artifact is not a usable model: {reason}")]
    Deserialization { reason: String },

    #[error("cannot access cached artifact '{}': {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Stable snake_case name used in logs and the reload response
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Credential { .. } => "credential_error",
            LoadError::Fetch { .. } => "fetch_error",
            LoadError::Deserialization { .. } => "deserialization_error",
            LoadError::Cache { .. } => "cache_error",
        }
    }

    /// Only network fetches are worth retrying; a missing key file
    /// or a corrupt artifact will fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, LoadError::Fetch { .. })
    }
}

// ─── Request handling ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("model not loaded")]
    NotReady,

    #[error("prediction failed: {0}")]
    Inference(#[from] PredictError),
}
