// ============================================================
// Layer 1 — Server Bootstrap
// ============================================================
// Wires the layers together and runs until Ctrl-C:
//
//   ServiceState ─┬─ PredictUseCase (reads)
//                 └─ ModelLifecycle (writes) ← ArtifactLoader
//
// The listener is bound before the model loads, so /live_check
// answers while the artifact is still being fetched and
// /ready_check reports not_ready until it is installed.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::application::config::ServeConfig;
use crate::application::lifecycle::ModelLifecycle;
use crate::application::predict_use_case::PredictUseCase;
use crate::domain::state::ServiceState;
use crate::domain::traits::ModelSource;
use crate::http::{router, AppContext};
use crate::infra::artifact_loader::ArtifactLoader;
use crate::infra::telemetry::TracingSink;

pub async fn serve(cfg: ServeConfig) -> Result<()> {
    let state = Arc::new(ServiceState::new());
    let source: Arc<dyn ModelSource> = Arc::new(ArtifactLoader::new(&cfg));
    let lifecycle = Arc::new(ModelLifecycle::new(state.clone(), source, cfg.retry_policy()));
    let predictor = Arc::new(PredictUseCase::new(state.clone(), Arc::new(TracingSink)));

    let ctx = AppContext {
        state: state.clone(),
        predictor,
        lifecycle: cfg.enable_reload.then(|| lifecycle.clone()),
    };

    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("Cannot bind '{}'", cfg.bind))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let startup = lifecycle.clone();
    tokio::task::spawn_blocking(move || startup.startup());

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .context("HTTP server stopped unexpectedly")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(state: Arc<ServiceState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C ({e}); running until killed");
        std::future::pending::<()>().await;
    }
    state.mark_dead();
    tracing::info!("Shutdown requested; draining connections");
}
