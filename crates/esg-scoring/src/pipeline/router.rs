use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::ports::{FormulaEvaluator, IndustryBackfill};
use super::service::{EsgScoringService, ScoringServiceError};
use crate::scoring::{metric_map_from_json, ScoreReport, SubfactorScores};

#[derive(Debug, Deserialize)]
pub(crate) struct FormulaRequest {
    pub(crate) overall_data: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BackfillRequest {
    pub(crate) subfactor_scores: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinalScoreRequest {
    pub(crate) final_subfactor_scores: Value,
}

/// Router builder exposing the scoring pipeline stages over HTTP.
pub fn scoring_router<F, B>(service: Arc<EsgScoringService<F, B>>) -> Router
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    Router::new()
        .route(
            "/api/calculate-esg-scores-by-formulas",
            post(formula_handler::<F, B>),
        )
        .route(
            "/api/fill-missing-esg-sub-scores-by-industryavg",
            post(backfill_handler::<F, B>),
        )
        .route(
            "/api/calculate-final-esg-score",
            post(final_score_handler::<F, B>),
        )
        .route("/api/esg-report", post(report_handler::<F, B>))
        .route("/api/esg-pipeline", post(pipeline_handler::<F, B>))
        .with_state(service)
}

pub(crate) async fn formula_handler<F, B>(
    State(service): State<Arc<EsgScoringService<F, B>>>,
    payload: Result<Json<FormulaRequest>, JsonRejection>,
) -> Response
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let metrics = match metric_map_from_json(&request.overall_data) {
        Ok(metrics) => metrics,
        Err(err) => return error_response(err.into()),
    };

    match service.score_subfactors(&metrics).await {
        Ok(scores) => {
            (StatusCode::OK, Json(json!({ "subfactor_scores": scores }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn backfill_handler<F, B>(
    State(service): State<Arc<EsgScoringService<F, B>>>,
    payload: Result<Json<BackfillRequest>, JsonRejection>,
) -> Response
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let scores = match SubfactorScores::from_json("subfactor_scores", &request.subfactor_scores) {
        Ok(scores) => scores,
        Err(err) => return error_response(err.into()),
    };

    match service.fill_missing(scores).await {
        Ok(filled) => (
            StatusCode::OK,
            Json(json!({ "final_subfactor_scores": filled })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn final_score_handler<F, B>(
    State(service): State<Arc<EsgScoringService<F, B>>>,
    payload: Result<Json<FinalScoreRequest>, JsonRejection>,
) -> Response
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match SubfactorScores::from_json("final_subfactor_scores", &request.final_subfactor_scores) {
        Ok(scores) => (StatusCode::OK, Json(service.finalize(&scores))).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn report_handler<F, B>(
    State(_service): State<Arc<EsgScoringService<F, B>>>,
    payload: Result<Json<FinalScoreRequest>, JsonRejection>,
) -> Response
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match SubfactorScores::from_json("final_subfactor_scores", &request.final_subfactor_scores) {
        Ok(scores) => {
            let report = ScoreReport::build(&scores, Utc::now());
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn pipeline_handler<F, B>(
    State(service): State<Arc<EsgScoringService<F, B>>>,
    payload: Result<Json<FormulaRequest>, JsonRejection>,
) -> Response
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let metrics = match metric_map_from_json(&request.overall_data) {
        Ok(metrics) => metrics,
        Err(err) => return error_response(err.into()),
    };

    match service.run(&metrics).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Malformed envelopes keep the `{ "error": .. }` body shape. Missing or
/// mistyped fields are 422, unparsable JSON 400, wrong content type 415.
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), Json(payload)).into_response()
}

fn error_response(error: ScoringServiceError) -> Response {
    let status = match &error {
        ScoringServiceError::EmptyMetrics | ScoringServiceError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScoringServiceError::Evaluation(_) => {
            warn!(error = %error, "evaluator failure");
            StatusCode::BAD_GATEWAY
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
