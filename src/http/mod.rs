// ============================================================
// Layer 1 — HTTP Presentation
// ============================================================
// The network face of the service.
//
//   GET  /             → banner
//   GET  /live_check   → 200 while the process is serving
//   GET  /ready_check  → 200 once a model is installed, else 503
//                        naming the phase (starting | degraded)
//   POST /predict      → species for one flower
//   POST /reload       → retry the model load (only with --enable-reload)
//
//   middleware.rs — trace id, timing header, panic → 500
//   handlers.rs   — one async fn per route
//   error.rs      — ServiceError / LoadError → status + JSON body
//   server.rs     — bind, start the model load, serve until Ctrl-C

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::application::lifecycle::ModelLifecycle;
use crate::application::predict_use_case::PredictUseCase;
use crate::domain::state::ServiceState;

/// Shared handles every handler can reach.
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<ServiceState>,
    pub predictor: Arc<PredictUseCase>,
    /// Present only when the reload route is enabled
    pub lifecycle: Option<Arc<ModelLifecycle>>,
}

pub fn router(ctx: AppContext) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::root))
        .route("/live_check", get(handlers::live_check))
        .route("/ready_check", get(handlers::ready_check))
        .route("/predict", post(handlers::predict));

    if ctx.lifecycle.is_some() {
        app = app.route("/reload", post(handlers::reload));
    }

    app.with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::observe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use parking_lot::Mutex;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::lifecycle::RetryPolicy;
    use crate::domain::errors::{LoadError, StoreError};
    use crate::domain::label::RawLabel;
    use crate::domain::traits::{Classifier, ModelSource};
    use crate::infra::telemetry::MemorySink;
    use crate::ml::fixtures::{FixedModel, PanickingModel, PANIC_TEXT};
    use crate::ml::model::ModelArtifact;
    use super::middleware::{PROCESS_TIME_HEADER, TRACE_ID_HEADER};

    const SCENARIO: &str =
        r#"{"sepal_length": 2.0, "sepal_width": 0.5, "petal_length": 1.0, "petal_width": 0.2}"#;

    /// Fails until `healed` is set.
    struct Flaky {
        healed: Mutex<bool>,
    }

    impl ModelSource for Flaky {
        fn load(&self) -> Result<Arc<dyn Classifier>, LoadError> {
            if *self.healed.lock() {
                Ok(Arc::new(FixedModel::new(RawLabel::Index(0))))
            } else {
                Err(LoadError::Fetch {
                    bucket: "b".into(),
                    key: "k".into(),
                    source: StoreError::Request("connection refused".into()),
                })
            }
        }
    }

    fn context(model: Option<Arc<dyn Classifier>>) -> (AppContext, Arc<MemorySink>) {
        let state = Arc::new(ServiceState::new());
        if let Some(m) = model {
            state.install(m);
        }
        let sink = Arc::new(MemorySink::new());
        let predictor = Arc::new(PredictUseCase::new(state.clone(), sink.clone()));
        (AppContext { state, predictor, lifecycle: None }, sink)
    }

    async fn send(app: Router, method: &str, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.oneshot(req).await.unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_banner_unchanged_by_model_load() {
        let (ctx, _) = context(None);
        let app = router(ctx.clone());
        let before = send(app.clone(), "GET", "/", "").await;
        assert_eq!(before.status(), StatusCode::OK);
        let before = json_body(before).await;
        assert_eq!(before["message"], handlers::BANNER);

        ctx.state.install(Arc::new(FixedModel::new(RawLabel::Index(0))));
        let after = send(app, "GET", "/", "").await;
        assert_eq!(after.status(), StatusCode::OK);
        assert_eq!(json_body(after).await, before);
    }

    #[tokio::test]
    async fn test_live_while_model_missing() {
        let (ctx, _) = context(None);
        let app = router(ctx);
        assert_eq!(send(app.clone(), "GET", "/live_check", "").await.status(), StatusCode::OK);

        let resp = send(app, "GET", "/ready_check", "").await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "not_ready");
        assert_eq!(body["phase"], "starting");
    }

    #[tokio::test]
    async fn test_not_alive_after_shutdown() {
        let (ctx, _) = context(None);
        ctx.state.mark_dead();
        let resp = send(router(ctx), "GET", "/live_check", "").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_ready_once_installed() {
        let (ctx, _) = context(Some(Arc::new(FixedModel::new(RawLabel::Index(0)))));
        let resp = send(router(ctx), "GET", "/ready_check", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ready");
    }

    #[tokio::test]
    async fn test_predict_setosa() {
        let (ctx, sink) = context(Some(Arc::new(FixedModel::new(RawLabel::Index(0)))));
        let resp = send(router(ctx), "POST", "/predict", SCENARIO).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let timing = resp.headers().get(PROCESS_TIME_HEADER).unwrap().to_str().unwrap().to_string();
        assert!(timing.parse::<f64>().unwrap() >= 0.0);
        let header_id = resp.headers().get(TRACE_ID_HEADER).unwrap().to_str().unwrap().to_string();

        let body = json_body(resp).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["predicted_label"], 0);
        assert_eq!(body["species"], "setosa");
        assert_eq!(body["trace_id"], header_id.as_str());
        assert_eq!(sink.events()[0].trace_id, header_id);
    }

    #[tokio::test]
    async fn test_predict_real_artifact() {
        let model = ModelArtifact::from_slice(crate::ml::fixtures::IRIS_CENTROIDS_JSON.as_bytes()).unwrap();
        let (ctx, _) = context(Some(Arc::new(model)));
        let body = r#"{"sepal_length": 6.9, "sepal_width": 3.1, "petal_length": 5.6, "petal_width": 2.2}"#;
        let resp = send(router(ctx), "POST", "/predict", body).await;
        assert_eq!(json_body(resp).await["species"], "virginica");
    }

    #[tokio::test]
    async fn test_predict_invalid_input_is_422() {
        let model = Arc::new(FixedModel::new(RawLabel::Index(0)));
        let (ctx, _) = context(Some(model.clone()));
        let body = r#"{"sepal_length": "abc", "sepal_width": 0.5, "petal_length": 1.0}"#;
        let resp = send(router(ctx), "POST", "/predict", body).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(resp.headers().contains_key(PROCESS_TIME_HEADER));

        let body = json_body(resp).await;
        let issues = body["detail"].as_array().unwrap();
        assert_eq!(issues.len(), 2);
        assert!(body["trace_id"].is_string());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_predict_not_ready_is_503() {
        let (ctx, _) = context(None);
        let resp = send(router(ctx), "POST", "/predict", SCENARIO).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(resp).await["detail"], "Model not loaded. Try again later.");
    }

    #[tokio::test]
    async fn test_predict_model_panic_is_500() {
        let (ctx, _) = context(Some(Arc::new(PanickingModel)));
        let resp = send(router(ctx), "POST", "/predict", SCENARIO).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(resp).await;
        assert_eq!(body["detail"], "Prediction failed");
        assert!(!body.to_string().contains(PANIC_TEXT));
    }

    #[tokio::test]
    async fn test_inherits_trace_id_header() {
        let (ctx, _) = context(Some(Arc::new(FixedModel::new(RawLabel::Index(1)))));
        let req = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
            .body(Body::from(SCENARIO))
            .unwrap();
        let resp = router(ctx).oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[TRACE_ID_HEADER], "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(json_body(resp).await["trace_id"], "4bf92f3577b34da6a3ce929d0e0e4736");
    }

    async fn exploding_handler() -> &'static str {
        panic!("{}", PANIC_TEXT)
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_generic_500() {
        let app = Router::new()
            .route("/boom", get(exploding_handler))
            .layer(axum::middleware::from_fn(middleware::observe));

        let resp = send(app, "GET", "/boom", "").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().contains_key(PROCESS_TIME_HEADER));
        let trace_id = resp.headers()[TRACE_ID_HEADER].to_str().unwrap().to_string();

        let body = json_body(resp).await;
        assert_eq!(body["detail"], "Internal Server Error");
        assert_eq!(body["trace_id"], trace_id.as_str());
        assert!(!body.to_string().contains(PANIC_TEXT));
    }

    #[tokio::test]
    async fn test_reload_route_hidden_by_default() {
        let (ctx, _) = context(None);
        let resp = send(router(ctx), "POST", "/reload", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reload_recovers_from_degraded() {
        let (mut ctx, _) = context(None);
        let source = Arc::new(Flaky { healed: Mutex::new(false) });
        let lifecycle = Arc::new(ModelLifecycle::new(ctx.state.clone(), source.clone(), RetryPolicy::none()));
        lifecycle.startup();
        ctx.lifecycle = Some(lifecycle);
        let app = router(ctx);

        let resp = send(app.clone(), "POST", "/reload", "").await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(resp).await["kind"], "fetch_error");
        let resp = send(app.clone(), "GET", "/ready_check", "").await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(resp).await["phase"], "degraded");

        *source.healed.lock() = true;
        let resp = send(app.clone(), "POST", "/reload", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(send(app.clone(), "GET", "/ready_check", "").await.status(), StatusCode::OK);
        assert_eq!(send(app, "POST", "/predict", SCENARIO).await.status(), StatusCode::OK);
    }
}
