// ============================================================
// Layer 5 — Inferencer
// ============================================================
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::domain::errors::PredictError;
use crate::domain::features::FeatureVector;
use crate::domain::label::RawLabel;
use crate::domain::traits::Classifier;

pub struct Inferencer {
    model: Arc<dyn Classifier>,
}

impl Inferencer {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model }
    }

    /// Run the model on a batch of one and return the first label.
    ///
    /// A panic inside the model is contained here and reported as
    /// `PredictError::Panicked`; it never unwinds into the handler.
    pub fn predict(&self, features: &FeatureVector) -> Result<RawLabel, PredictError> {
        let batch = std::slice::from_ref(features);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.model.predict(batch)));

        let labels = match outcome {
            Ok(result) => result?,
            Err(payload) => return Err(PredictError::Panicked(panic_message(payload.as_ref()))),
        };

        tracing::debug!(model = self.model.kind(), rows = labels.len(), "model returned");
        labels.into_iter().next().ok_or(PredictError::EmptyOutput)
    }
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::fixtures::{EmptyModel, FixedModel, PanickingModel, PANIC_TEXT};

    fn input() -> FeatureVector {
        FeatureVector::new([2.0, 0.5, 1.0, 0.2]).unwrap()
    }

    #[test]
    fn test_returns_first_label() {
        let inf = Inferencer::new(Arc::new(FixedModel::new(RawLabel::Index(0))));
        assert_eq!(inf.predict(&input()).unwrap(), RawLabel::Index(0));
    }

    #[test]
    fn test_panic_becomes_error() {
        let inf = Inferencer::new(Arc::new(PanickingModel));
        match inf.predict(&input()) {
            Err(PredictError::Panicked(msg)) => assert!(msg.contains(PANIC_TEXT)),
            other => panic!("expected Panicked, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let inf = Inferencer::new(Arc::new(EmptyModel));
        assert_eq!(inf.predict(&input()), Err(PredictError::EmptyOutput));
    }
}
