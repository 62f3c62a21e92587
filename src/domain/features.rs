// ============================================================
// Layer 3 — FeatureVector Domain Type
// ============================================================
// The four iris measurements, always in this order:
//
//   [sepal_length, sepal_width, petal_length, petal_width]
//
// A FeatureVector can only be built through `new`, which
// rejects NaN and ±infinity. Everything downstream (the model,
// the event log) can therefore assume four finite values.

use serde::Serialize;

use crate::domain::errors::FeatureError;

/// Field names in the fixed order the model expects.
pub const FEATURE_NAMES: [&str; 4] = [
    "sepal_length",
    "sepal_width",
    "petal_length",
    "petal_width",
];

/// Number of features every model consumes.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Exactly four finite measurements.
/// Serialises as a plain JSON array so log lines stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector, rejecting the first non-finite value.
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self, FeatureError> {
        for (name, value) in FEATURE_NAMES.iter().zip(values.iter()) {
            if !value.is_finite() {
                return Err(FeatureError::NotFinite {
                    field: (*name).to_string(),
                });
            }
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Value at a feature index (0..4). Out-of-range indexes are
    /// a model bug, so they surface as `None` rather than a panic.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}
