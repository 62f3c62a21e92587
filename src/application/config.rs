// ============================================================
// Layer 2 — Service Configuration
// ============================================================
// All load-time settings for the service. Built from CLI flags /
// environment variables in Layer 1; nothing can change them while
// the process runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::lifecycle::RetryPolicy;
use crate::infra::object_store::DEFAULT_ENDPOINT;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_BUCKET: &str = "mlops-course-phonic-axle-473506-u8-unique";
pub const DEFAULT_OBJECT_KEY: &str = "dvcstore/files/md5/b5/0729b0bfd352c510335b6e0c71b236";
pub const DEFAULT_CACHE_PATH: &str = "models/model.json";
pub const DEFAULT_CREDENTIALS_PATH: &str = "github-dvc-key.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Socket address the HTTP server listens on
    pub bind: String,
    /// Remote storage bucket holding the artifact
    pub bucket: String,
    /// Object key of the artifact inside the bucket
    pub object_key: String,
    /// Local cache file; when present, no network fetch happens
    pub cache_path: String,
    /// Bearer-token file for the storage API
    pub credentials_path: String,
    /// Storage API base URL, or file:///dir for a local mirror
    pub storage_endpoint: String,
    /// Extra attempts after a failed fetch at startup (0 = none)
    pub load_retries: u32,
    pub retry_delay_ms: u64,
    /// Expose POST /reload
    pub enable_reload: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind:             DEFAULT_BIND.to_string(),
            bucket:           DEFAULT_BUCKET.to_string(),
            object_key:       DEFAULT_OBJECT_KEY.to_string(),
            cache_path:       DEFAULT_CACHE_PATH.to_string(),
            credentials_path: DEFAULT_CREDENTIALS_PATH.to_string(),
            storage_endpoint: DEFAULT_ENDPOINT.to_string(),
            load_retries:     0,
            retry_delay_ms:   2_000,
            enable_reload:    false,
        }
    }
}

impl ServeConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.load_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
