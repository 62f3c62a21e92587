// ============================================================
// Layer 6 — Telemetry Sinks
// ============================================================
// Every prediction attempt produces one PredictionEvent. In
// production it goes out through `tracing` as a single event
// under the `iris_serve::events` target, so the subscriber
// configured in main (plain text or JSON) decides its shape.
//
// With `--log-format json` a success looks like:
//   {"timestamp":"...","level":"INFO","fields":{"event":"prediction",
//    "trace_id":"4bf9...","input":"[5.1,3.5,1.4,0.2]",
//    "output":"{\"predicted_label\":0,\"species\":\"setosa\"}",
//    "latency_ms":0.04,"status":"success"},"target":"iris_serve::events"}

#[cfg(test)]
use parking_lot::Mutex;

use crate::domain::event::{Outcome, PredictionEvent};
use crate::domain::traits::EventSink;

/// Forwards events to the global tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, e: &PredictionEvent) {
        let input = e
            .input
            .as_ref()
            .and_then(|v| serde_json::to_string(v).ok())
            .unwrap_or_default();
        let output = e
            .output
            .as_ref()
            .and_then(|o| serde_json::to_string(o).ok())
            .unwrap_or_default();

        match e.status {
            Outcome::Success => tracing::info!(
                target: "iris_serve::events",
                event = e.event,
                trace_id = %e.trace_id,
                input = %input,
                output = %output,
                latency_ms = e.latency_ms,
                status = e.status.as_str(),
            ),
            Outcome::ValidationError | Outcome::NotReady => tracing::warn!(
                target: "iris_serve::events",
                event = e.event,
                trace_id = %e.trace_id,
                input = %input,
                latency_ms = e.latency_ms,
                status = e.status.as_str(),
                error = e.error.as_deref().unwrap_or_default(),
            ),
            Outcome::InferenceError => tracing::error!(
                target: "iris_serve::events",
                event = e.event,
                trace_id = %e.trace_id,
                input = %input,
                latency_ms = e.latency_ms,
                status = e.status.as_str(),
                error = e.error.as_deref().unwrap_or_default(),
            ),
        }
    }
}

/// Keeps events in memory so tests can assert on them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<PredictionEvent>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PredictionEvent> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl EventSink for MemorySink {
    fn record(&self, event: &PredictionEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventOutput;
    use crate::domain::features::FeatureVector;
    use crate::domain::label::{RawLabel, Species};

    fn sample() -> PredictionEvent {
        PredictionEvent::success(
            "abc",
            FeatureVector::new([1.0, 2.0, 3.0, 4.0]).unwrap(),
            EventOutput { predicted_label: RawLabel::Index(0), species: Species::Setosa },
            0.5,
        )
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record(&sample());
        sink.record(&PredictionEvent::failure("def", None, Outcome::NotReady, "model not loaded".into(), 0.1));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].trace_id, "abc");
        assert_eq!(events[1].status, Outcome::NotReady);
    }

    #[test]
    fn test_tracing_sink_accepts_every_outcome() {
        // No subscriber installed: must not panic for any outcome
        let sink = TracingSink;
        sink.record(&sample());
        for status in [Outcome::ValidationError, Outcome::NotReady, Outcome::InferenceError] {
            sink.record(&PredictionEvent::failure("x", None, status, "boom".into(), 0.0));
        }
    }

    #[test]
    fn test_event_json_shape() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["event"], "prediction");
        assert_eq!(v["status"], "success");
        assert_eq!(v["output"]["species"], "setosa");
        assert!(v.get("error").is_none());
    }
}
