// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with `clap` and routes to Layer 2.
//
//   `serve`   — starts a tokio runtime and the HTTP server
//   `fetch`   — refreshes the cached artifact, no server
//   `predict` — one-off prediction, printed as JSON
//
// `fetch` and `predict` stay fully synchronous; only `serve`
// needs an async runtime.

pub mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, FetchArgs, LogFormat, PredictArgs, ServeArgs};

use crate::application::config::ServeConfig;
use crate::application::predict_use_case::PredictUseCase;
use crate::domain::features::FeatureVector;
use crate::domain::state::ServiceState;
use crate::domain::traits::ModelSource;
use crate::infra::artifact_loader::ArtifactLoader;
use crate::infra::telemetry::TracingSink;

#[derive(Parser, Debug)]
#[command(
    name = "iris-serve",
    version,
    about = "Serve iris species predictions from a remotely stored model."
)]
pub struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, env = "IRIS_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(args)   => run_serve(args),
            Commands::Fetch(args)   => run_fetch(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let cfg: ServeConfig = args.into();
    tracing::info!(
        "Starting server on {} (model gs://{}/{}, cache '{}')",
        cfg.bind,
        cfg.bucket,
        cfg.object_key,
        cfg.cache_path
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot start async runtime")?;
    runtime.block_on(crate::http::server::serve(cfg))
}

fn run_fetch(args: FetchArgs) -> Result<()> {
    let cfg: ServeConfig = args.storage.into();
    let loader = ArtifactLoader::new(&cfg);

    let bytes = loader
        .refresh_cache()
        .with_context(|| format!("Cannot fetch gs://{}/{}", cfg.bucket, cfg.object_key))?;

    println!("Cached {} bytes at {}", bytes, loader.cache_path().display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let features = FeatureVector::new(args.values())?;
    let cfg: ServeConfig = args.storage.into();

    let model = ArtifactLoader::new(&cfg)
        .load()
        .context("Cannot load model")?;
    let state = Arc::new(ServiceState::new());
    state.install(model);

    let trace_id = uuid::Uuid::new_v4().simple().to_string();
    let use_case = PredictUseCase::new(state, Arc::new(TracingSink));
    let response = use_case.predict(features, &trace_id)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
