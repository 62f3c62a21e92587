// ============================================================
// Layer 3 — Service State
// ============================================================
// Process-wide state shared by every request handler:
//
//   alive  → true for as long as the process is serving
//   ready  → true once a model has been installed
//   model  → the installed classifier, if any
//
// Lifecycle:
//
//   Starting ──load ok──▶ Ready
//       │
//       └──load failed──▶ Degraded ──explicit reload ok──▶ Ready
//
// Single-writer discipline: only the model lifecycle (Layer 2)
// calls `install` / `record_load_failure`. Handlers get read
// access through `model()`, which clones an Arc and releases the
// lock immediately, so inference itself never holds a lock.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::domain::traits::Classifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Starting,
    Ready,
    Degraded,
}

impl Lifecycle {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Lifecycle::Ready,
            2 => Lifecycle::Degraded,
            _ => Lifecycle::Starting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Lifecycle::Starting => 0,
            Lifecycle::Ready => 1,
            Lifecycle::Degraded => 2,
        }
    }
}

pub struct ServiceState {
    alive: AtomicBool,
    ready: AtomicBool,
    phase: AtomicU8,
    model: RwLock<Option<Arc<dyn Classifier>>>,
}

impl ServiceState {
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            ready: AtomicBool::new(false),
            phase: AtomicU8::new(Lifecycle::Starting.as_u8()),
            model: RwLock::new(None),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// The installed model, or None while Starting / Degraded.
    pub fn model(&self) -> Option<Arc<dyn Classifier>> {
        self.model.read().clone()
    }

    /// Install a freshly loaded model. The model is stored before the
    /// ready flag flips, so a handler that sees `ready == true` always
    /// finds a model.
    pub fn install(&self, model: Arc<dyn Classifier>) {
        *self.model.write() = Some(model);
        self.phase.store(Lifecycle::Ready.as_u8(), Ordering::Release);
        self.ready.store(true, Ordering::Release);
    }

    /// A load attempt failed. Without a previous model the service is
    /// Degraded; a failed reload keeps serving the model it already has.
    pub fn record_load_failure(&self) -> Lifecycle {
        if self.model.read().is_some() {
            return Lifecycle::Ready;
        }
        self.ready.store(false, Ordering::Release);
        self.phase.store(Lifecycle::Degraded.as_u8(), Ordering::Release);
        Lifecycle::Degraded
    }

    /// Flip liveness off, e.g. while shutting down.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PredictError;
    use crate::domain::features::FeatureVector;
    use crate::domain::label::RawLabel;

    struct Constant;

    impl Classifier for Constant {
        fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<RawLabel>, PredictError> {
            Ok(batch.iter().map(|_| RawLabel::Index(0)).collect())
        }
        fn kind(&self) -> &'static str {
            "constant"
        }
    }

    #[test]
    fn test_starts_alive_but_not_ready() {
        let s = ServiceState::new();
        assert!(s.is_alive());
        assert!(!s.is_ready());
        assert_eq!(s.lifecycle(), Lifecycle::Starting);
        assert!(s.model().is_none());
    }

    #[test]
    fn test_install_makes_ready() {
        let s = ServiceState::new();
        s.install(Arc::new(Constant));
        assert!(s.is_ready());
        assert_eq!(s.lifecycle(), Lifecycle::Ready);
        assert!(s.model().is_some());
    }

    #[test]
    fn test_failed_first_load_degrades() {
        let s = ServiceState::new();
        assert_eq!(s.record_load_failure(), Lifecycle::Degraded);
        assert!(!s.is_ready());
        assert!(s.is_alive());
    }

    #[test]
    fn test_failed_reload_keeps_previous_model() {
        let s = ServiceState::new();
        s.install(Arc::new(Constant));
        assert_eq!(s.record_load_failure(), Lifecycle::Ready);
        assert!(s.is_ready());
    }

    #[test]
    fn test_degraded_recovers_on_install() {
        let s = ServiceState::new();
        s.record_load_failure();
        s.install(Arc::new(Constant));
        assert_eq!(s.lifecycle(), Lifecycle::Ready);
    }
}
