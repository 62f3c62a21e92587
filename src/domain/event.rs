// ============================================================
// Layer 3 — Prediction Event
// ============================================================
// One record per /predict attempt, successful or not. The
// trace_id ties it to the response the caller received and to
// any other log line emitted while handling the request.

use serde::Serialize;

use crate::domain::features::FeatureVector;
use crate::domain::label::{RawLabel, Species};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    ValidationError,
    NotReady,
    InferenceError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ValidationError => "validation_error",
            Outcome::NotReady => "not_ready",
            Outcome::InferenceError => "inference_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOutput {
    pub predicted_label: RawLabel,
    pub species: Species,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionEvent {
    /// "prediction" on success, "prediction_error" otherwise
    pub event: &'static str,
    pub trace_id: String,
    /// Absent when the body never made it through validation
    pub input: Option<FeatureVector>,
    pub output: Option<EventOutput>,
    pub latency_ms: f64,
    pub status: Outcome,
    /// Internal error text. Logged only, never sent to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionEvent {
    pub fn success(
        trace_id: &str,
        input: FeatureVector,
        output: EventOutput,
        latency_ms: f64,
    ) -> Self {
        Self {
            event: "prediction",
            trace_id: trace_id.to_string(),
            input: Some(input),
            output: Some(output),
            latency_ms,
            status: Outcome::Success,
            error: None,
        }
    }

    pub fn failure(
        trace_id: &str,
        input: Option<FeatureVector>,
        status: Outcome,
        error: String,
        latency_ms: f64,
    ) -> Self {
        Self {
            event: "prediction_error",
            trace_id: trace_id.to_string(),
            input,
            output: None,
            latency_ms,
            status,
            error: Some(error),
        }
    }
}
