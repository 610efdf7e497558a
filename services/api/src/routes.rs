use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use esg_scoring::pipeline::{scoring_router, EsgScoringService, FormulaEvaluator, IndustryBackfill};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_scoring_routes<F, B>(service: Arc<EsgScoringService<F, B>>) -> axum::Router
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    scoring_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_scoring_service;
    use axum::body::Body;
    use axum::http::Request;
    use esg_scoring::config::EvaluatorConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let service = build_scoring_service(&EvaluatorConfig::default()).expect("service builds");
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        };
        with_scoring_routes(service).layer(Extension(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(true)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn final_score_works_without_evaluator_credentials() {
        let request = Request::post("/api/calculate-final-esg-score")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"final_subfactor_scores": {"Environmental": {"GHG Score": 80}, "Social": {"Retention Score": 70}, "Governance": {}}}"#,
            ))
            .expect("request");

        let response = app(true).oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ESG_score"], json!(56.5));
    }

    #[tokio::test]
    async fn formula_endpoint_without_api_key_is_a_gateway_error() {
        let request = Request::post("/api/calculate-esg-scores-by-formulas")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"overall_data": {"Vehicles produced": 1000}}"#))
            .expect("request");

        let response = app(true).oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("not configured"));
    }
}
