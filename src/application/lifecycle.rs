// ============================================================
// Layer 2 — Model Lifecycle
// ============================================================
// The only writer of ServiceState.
//
//   startup() → runs once, on a blocking thread, while the HTTP
//               server is already answering liveness checks.
//               Success installs the model (Ready); failure is
//               logged and swallowed (Degraded). Never panics,
//               never exits the process.
//
//   reload()  → explicit, operator-triggered second attempt.
//               The only way out of Degraded.
//
// Loads never overlap: a reload requested while the startup load
// is still running waits for it, so two loads never race on the
// cache file.
//
// Retries: by default a failed fetch is reported once and left to
// the operator. RetryPolicy adds a bounded number of extra attempts
// for transient (fetch) errors only.

use std::{sync::Arc, thread, time::Duration};

use parking_lot::Mutex;

use crate::domain::errors::LoadError;
use crate::domain::state::{Lifecycle, ServiceState};
use crate::domain::traits::{Classifier, ModelSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    #[cfg(test)]
    pub fn none() -> Self {
        Self { retries: 0, delay: Duration::ZERO }
    }
}

pub struct ModelLifecycle {
    state: Arc<ServiceState>,
    source: Arc<dyn ModelSource>,
    retry: RetryPolicy,
    load_lock: Mutex<()>,
}

impl ModelLifecycle {
    pub fn new(state: Arc<ServiceState>, source: Arc<dyn ModelSource>, retry: RetryPolicy) -> Self {
        Self { state, source, retry, load_lock: Mutex::new(()) }
    }

    pub fn startup(&self) -> Lifecycle {
        let _loading = self.load_lock.lock();
        match self.load_with_retry() {
            Ok(model) => {
                self.state.install(model);
                tracing::info!("Model ready; accepting predictions");
                Lifecycle::Ready
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Could not load model on startup: {e}");
                self.state.record_load_failure()
            }
        }
    }

    pub fn reload(&self) -> Result<Lifecycle, LoadError> {
        let _loading = self.load_lock.lock();
        tracing::info!("Reloading model");
        match self.source.load() {
            Ok(model) => {
                self.state.install(model);
                tracing::info!("Model reloaded");
                Ok(Lifecycle::Ready)
            }
            Err(e) => {
                let now = self.state.record_load_failure();
                tracing::error!(kind = e.kind(), state = ?now, "Reload failed: {e}");
                Err(e)
            }
        }
    }

    fn load_with_retry(&self) -> Result<Arc<dyn Classifier>, LoadError> {
        let mut attempt = 0;
        loop {
            match self.source.load() {
                Ok(model) => return Ok(model),
                Err(e) if e.is_transient() && attempt < self.retry.retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Load attempt {attempt} failed ({e}); retrying in {:?}",
                        self.retry.delay
                    );
                    thread::sleep(self.retry.delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
