// ============================================================
// Layer 6 — Object Stores
// ============================================================
// Two ObjectStore implementations, chosen by the configured
// storage endpoint:
//
//   https://storage.googleapis.com  → GcsObjectStore
//       GET {endpoint}/storage/v1/b/{bucket}/o/{key}?alt=media
//       with "Authorization: Bearer <token>"
//
//   file:///srv/mirror              → FsObjectStore
//       reads {dir}/{bucket}/{key} from local disk; useful for
//       air-gapped mirrors and for tests
//
// Object keys contain '/', which the JSON API requires to be
// percent-encoded inside the single {key} path segment.

use std::{fs, io, path::PathBuf, time::Duration};

use reqwest::{blocking::Client, StatusCode, Url};

use crate::domain::errors::StoreError;
use crate::domain::traits::ObjectStore;
use crate::infra::credentials::Credentials;

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";
const FILE_SCHEME: &str = "file://";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the store that matches `endpoint`.
pub fn open_store(
    endpoint: &str,
    bucket: &str,
    credentials: Credentials,
) -> Result<Box<dyn ObjectStore>, StoreError> {
    match endpoint.strip_prefix(FILE_SCHEME) {
        Some(dir) => Ok(Box::new(FsObjectStore::new(PathBuf::from(dir).join(bucket)))),
        None => Ok(Box::new(GcsObjectStore::new(endpoint, bucket, credentials)?)),
    }
}

// ─── Local directory ──────────────────────────────────────────────────────────

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for FsObjectStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(key);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::Io(e),
        })
    }
}

// ─── Google Cloud Storage JSON API ────────────────────────────────────────────

pub struct GcsObjectStore {
    endpoint: Url,
    bucket: String,
    credentials: Credentials,
    client: Client,
}

impl GcsObjectStore {
    pub fn new(endpoint: &str, bucket: &str, credentials: Credentials) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StoreError::Request(format!("bad storage endpoint '{endpoint}': {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok(Self {
            endpoint,
            bucket: bucket.to_string(),
            credentials,
            client,
        })
    }

    fn object_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Request(format!("endpoint '{}' cannot hold a path", self.endpoint)))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o", key]);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }
}

impl ObjectStore for GcsObjectStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.object_url(key)?;
        tracing::debug!(%url, "fetching object");

        let resp = self
            .client
            .get(url)
            .bearer_auth(self.credentials.bearer_token())
            .send()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            s if !s.is_success() => Err(StoreError::Status {
                key: key.to_string(),
                status: s.as_u16(),
            }),
            _ => {
                let bytes = resp.bytes().map_err(|e| StoreError::Request(e.to_string()))?;
                Ok(bytes.to_vec())
            }
        }
    }
}
