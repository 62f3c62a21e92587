// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// One /predict request, start to finish:
//
//   Step 1: Validate the body            (Layer 4 - data)
//   Step 2: Check a model is installed   (Layer 3 - state)
//   Step 3: Run the model                (Layer 5 - ml)
//   Step 4: Normalise the label          (Layer 3 - label)
//   Step 5: Record one PredictionEvent   (Layer 6 - telemetry)
//
// Step 5 happens on every path, including the failing ones.
// Nothing here knows about HTTP; Layer 1 maps ServiceError
// onto status codes.

use std::{sync::Arc, time::Instant};

use serde::Serialize;

use crate::data::validator::parse_features;
use crate::domain::errors::{ServiceError, ValidationError};
use crate::domain::event::{EventOutput, Outcome, PredictionEvent};
use crate::domain::features::FeatureVector;
use crate::domain::label::{RawLabel, Species};
use crate::domain::state::ServiceState;
use crate::domain::traits::EventSink;
use crate::ml::inferencer::Inferencer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub status: &'static str,
    /// Exactly what the model returned: an integer or a string
    pub predicted_label: RawLabel,
    pub species: Species,
    pub latency_ms: f64,
    pub trace_id: String,
}

pub struct PredictUseCase {
    state: Arc<ServiceState>,
    sink: Arc<dyn EventSink>,
}

impl PredictUseCase {
    pub fn new(state: Arc<ServiceState>, sink: Arc<dyn EventSink>) -> Self {
        Self { state, sink }
    }

    /// Handle a raw JSON request body.
    pub fn execute(&self, body: &[u8], trace_id: &str) -> Result<PredictionResponse, ServiceError> {
        let started = Instant::now();
        let features = match parse_features(body) {
            Ok(f) => f,
            Err(e) => {
                self.sink.record(&PredictionEvent::failure(
                    trace_id,
                    None,
                    Outcome::ValidationError,
                    describe_issues(&e),
                    elapsed_ms(started),
                ));
                return Err(e.into());
            }
        };
        self.run(features, trace_id, started)
    }

    /// Handle an already-validated vector (CLI path).
    pub fn predict(&self, features: FeatureVector, trace_id: &str) -> Result<PredictionResponse, ServiceError> {
        self.run(features, trace_id, Instant::now())
    }

    fn run(
        &self,
        features: FeatureVector,
        trace_id: &str,
        started: Instant,
    ) -> Result<PredictionResponse, ServiceError> {
        let Some(model) = self.state.model() else {
            self.sink.record(&PredictionEvent::failure(
                trace_id,
                Some(features),
                Outcome::NotReady,
                "model not loaded".to_string(),
                elapsed_ms(started),
            ));
            return Err(ServiceError::NotReady);
        };

        let raw = match Inferencer::new(model).predict(&features) {
            Ok(raw) => raw,
            Err(e) => {
                self.sink.record(&PredictionEvent::failure(
                    trace_id,
                    Some(features),
                    Outcome::InferenceError,
                    e.to_string(),
                    elapsed_ms(started),
                ));
                return Err(e.into());
            }
        };

        let species = Species::from_raw(&raw);
        let latency_ms = elapsed_ms(started);

        self.sink.record(&PredictionEvent::success(
            trace_id,
            features,
            EventOutput { predicted_label: raw.clone(), species: species.clone() },
            latency_ms,
        ));

        Ok(PredictionResponse {
            status: "success",
            predicted_label: raw,
            species,
            latency_ms,
            trace_id: trace_id.to_string(),
        })
    }
}

/// Milliseconds since `started`, rounded to two decimals.
pub fn elapsed_ms(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

fn describe_issues(e: &ValidationError) -> String {
    let fields: Vec<String> = e
        .issues
        .iter()
        .map(|i| format!("{}: {}", i.loc.join("."), i.kind))
        .collect();
    format!("{e}: {}", fields.join(", "))
}
