// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The service talks to four things it does not own:
//
//   Classifier  → the pre-trained model (opaque artifact)
//   ObjectStore → remote storage the artifact is fetched from
//   ModelSource → whatever produces a ready-to-use Classifier
//   EventSink   → wherever structured prediction events go
//
// Programming against these traits lets the tests swap in
// in-memory fakes without touching the application layer.

use std::sync::Arc;

use crate::domain::errors::{LoadError, PredictError, StoreError};
use crate::domain::event::PredictionEvent;
use crate::domain::features::FeatureVector;
use crate::domain::label::RawLabel;

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A trained model. Takes a batch and returns one label per row;
/// the service always sends a batch of one and uses the first result.
///
/// Implementations must be read-only: the same input always yields
/// the same label, and concurrent calls never interfere.
pub trait Classifier: Send + Sync {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<RawLabel>, PredictError>;

    /// Short name of the model family, for log lines
    fn kind(&self) -> &'static str;
}

// ─── ObjectStore ──────────────────────────────────────────────────────────────
/// Remote (or mirrored) blob storage scoped to one bucket.
pub trait ObjectStore: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

// ─── ModelSource ──────────────────────────────────────────────────────────────
/// Produces a usable model, e.g. from a cache file or remote storage.
pub trait ModelSource: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Classifier>, LoadError>;
}

// ─── EventSink ────────────────────────────────────────────────────────────────
/// Receives one event per prediction attempt.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &PredictionEvent);
}
