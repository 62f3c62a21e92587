// ============================================================
// Layer 6 — Artifact Loader
// ============================================================
// Makes sure a usable model is available, preferring the local
// cache over the network:
//
//   cache file exists?
//     yes → read it → parse → model
//     no  → read credential file         (CredentialError)
//           → fetch bucket/key           (FetchError)
//           → parse                      (DeserializationError)
//           → write bytes to cache       (best effort)
//           → model
//
// Bytes are only cached after they parse, so a corrupt download
// never poisons the cache for the next start.
//
// File layout:
//   models/
//     model.json        ← cached artifact
//     model.json.part   ← in-flight write, renamed into place

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::application::config::ServeConfig;
use crate::domain::errors::{LoadError, StoreError};
use crate::domain::traits::{Classifier, ModelSource, ObjectStore};
use crate::infra::credentials::Credentials;
use crate::infra::object_store::open_store;
use crate::ml::model::ModelArtifact;

/// Where a loaded artifact came from, for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    Cache,
    Remote,
}

pub struct ArtifactLoader {
    cache_path: PathBuf,
    credentials_path: PathBuf,
    endpoint: String,
    bucket: String,
    key: String,
}

type OpenStore<'a> = dyn Fn(Credentials) -> Result<Box<dyn ObjectStore>, StoreError> + 'a;

impl ArtifactLoader {
    pub fn new(cfg: &ServeConfig) -> Self {
        Self {
            cache_path: PathBuf::from(&cfg.cache_path),
            credentials_path: PathBuf::from(&cfg.credentials_path),
            endpoint: cfg.storage_endpoint.clone(),
            bucket: cfg.bucket.clone(),
            key: cfg.object_key.clone(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Load from cache, falling back to the configured remote store.
    pub fn load_artifact(&self) -> Result<(ModelArtifact, ArtifactOrigin), LoadError> {
        self.load_with(&|creds| open_store(&self.endpoint, &self.bucket, creds))
    }

    /// Same as `load_artifact`, but with the store constructor injected.
    pub fn load_with(&self, open: &OpenStore<'_>) -> Result<(ModelArtifact, ArtifactOrigin), LoadError> {
        if self.cache_path.exists() {
            tracing::info!("Loading cached artifact from '{}'", self.cache_path.display());
            let bytes = fs::read(&self.cache_path).map_err(|source| LoadError::Cache {
                path: self.cache_path.clone(),
                source,
            })?;
            let artifact = parse(&bytes)?;
            return Ok((artifact, ArtifactOrigin::Cache));
        }

        tracing::info!(
            "No cached artifact at '{}'; fetching gs://{}/{}",
            self.cache_path.display(),
            self.bucket,
            self.key
        );
        let (artifact, _) = self.download_with(open)?;
        Ok((artifact, ArtifactOrigin::Remote))
    }

    /// Fetch from remote storage even if a cache file exists, and
    /// overwrite the cache. Returns the number of bytes cached.
    pub fn refresh_cache(&self) -> Result<usize, LoadError> {
        let (_, len) = self.download_with(&|creds| open_store(&self.endpoint, &self.bucket, creds))?;
        Ok(len)
    }

    fn download_with(&self, open: &OpenStore<'_>) -> Result<(ModelArtifact, usize), LoadError> {
        let creds = Credentials::from_file(&self.credentials_path)?;

        let fetch_err = |source: StoreError| LoadError::Fetch {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            source,
        };
        let store = open(creds).map_err(fetch_err)?;
        let bytes = store.fetch(&self.key).map_err(fetch_err)?;
        tracing::info!("Downloaded {} bytes", bytes.len());

        let artifact = parse(&bytes)?;
        if let Err(e) = self.write_cache(&bytes) {
            // The model is usable either way; only the next start pays for this.
            tracing::warn!("Could not cache artifact at '{}': {e}", self.cache_path.display());
        }
        Ok((artifact, bytes.len()))
    }

    fn write_cache(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut part = self.cache_path.clone().into_os_string();
        part.push(".part");
        let part = PathBuf::from(part);

        fs::write(&part, bytes)?;
        fs::rename(&part, &self.cache_path)?;
        tracing::debug!("Cached artifact at '{}'", self.cache_path.display());
        Ok(())
    }
}

fn parse(bytes: &[u8]) -> Result<ModelArtifact, LoadError> {
    ModelArtifact::from_slice(bytes).map_err(|e| LoadError::Deserialization {
        reason: e.to_string(),
    })
}

impl ModelSource for ArtifactLoader {
    fn load(&self) -> Result<Arc<dyn Classifier>, LoadError> {
        let (artifact, origin) = self.load_artifact()?;
        tracing::info!(model = artifact.kind(), ?origin, "Model loaded into memory");
        Ok(Arc::new(artifact))
    }
}
