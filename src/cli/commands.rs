// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   serve   — run the HTTP service
//   fetch   — download the artifact into the local cache
//   predict — classify one flower from the command line
//
// Every storage flag can also come from an IRIS_* environment
// variable, which is how the container image is configured.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::config::{
    ServeConfig, DEFAULT_BIND, DEFAULT_BUCKET, DEFAULT_CACHE_PATH, DEFAULT_CREDENTIALS_PATH,
    DEFAULT_OBJECT_KEY,
};
use crate::infra::object_store::DEFAULT_ENDPOINT;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the prediction API over HTTP
    Serve(ServeArgs),

    /// Download the model artifact and refresh the local cache
    Fetch(FetchArgs),

    /// Predict the species of a single flower
    Predict(PredictArgs),
}

/// Log line format for the tracing subscriber
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Where the model artifact lives, shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Storage bucket holding the artifact
    #[arg(long, env = "IRIS_BUCKET", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Object key of the artifact inside the bucket
    #[arg(long, env = "IRIS_MODEL_KEY", default_value = DEFAULT_OBJECT_KEY)]
    pub object_key: String,

    /// Local cache file; used instead of the network when present
    #[arg(long, env = "IRIS_CACHE_PATH", default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: String,

    /// File holding the storage bearer token
    #[arg(long, env = "IRIS_CREDENTIALS", default_value = DEFAULT_CREDENTIALS_PATH)]
    pub credentials: String,

    /// Storage API base URL, or file:///dir for a local mirror
    #[arg(long, env = "IRIS_STORAGE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub storage_endpoint: String,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Address to listen on
    #[arg(long, env = "IRIS_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Extra attempts after a failed fetch at startup
    #[arg(long, default_value_t = 0)]
    pub load_retries: u32,

    /// Pause between those attempts
    #[arg(long, default_value_t = 2_000)]
    pub retry_delay_ms: u64,

    /// Expose POST /reload to retry loading a model after a failed start
    #[arg(long)]
    pub enable_reload: bool,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Sepal length in cm
    #[arg(long)]
    pub sepal_length: f64,

    /// Sepal width in cm
    #[arg(long)]
    pub sepal_width: f64,

    /// Petal length in cm
    #[arg(long)]
    pub petal_length: f64,

    /// Petal width in cm
    #[arg(long)]
    pub petal_width: f64,
}

impl PredictArgs {
    pub fn values(&self) -> [f64; 4] {
        [self.sepal_length, self.sepal_width, self.petal_length, self.petal_width]
    }
}

/// Storage flags over the built-in defaults for everything else.
impl From<StorageArgs> for ServeConfig {
    fn from(a: StorageArgs) -> Self {
        ServeConfig {
            bucket:           a.bucket,
            object_key:       a.object_key,
            cache_path:       a.cache_path,
            credentials_path: a.credentials,
            storage_endpoint: a.storage_endpoint,
            ..ServeConfig::default()
        }
    }
}

impl From<ServeArgs> for ServeConfig {
    fn from(a: ServeArgs) -> Self {
        ServeConfig {
            bind:           a.bind,
            load_retries:   a.load_retries,
            retry_delay_ms: a.retry_delay_ms,
            enable_reload:  a.enable_reload,
            ..a.storage.into()
        }
    }
}
