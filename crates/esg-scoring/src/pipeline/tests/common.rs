use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::pipeline::ports::{EvaluationError, FormulaEvaluator, IndustryBackfill};
use crate::pipeline::{scoring_router, EsgScoringService};
use crate::scoring::{EsgCategory, MetricMap, MetricValue, SubfactorScores};

/// Evaluator returning a canned result and recording what it was asked.
#[derive(Default)]
pub(super) struct FixedEvaluator {
    pub(super) scores: SubfactorScores,
    pub(super) seen: Mutex<Vec<MetricMap>>,
}

impl FixedEvaluator {
    pub(super) fn returning(scores: SubfactorScores) -> Self {
        Self {
            scores,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.seen.lock().expect("evaluator mutex poisoned").len()
    }
}

impl FormulaEvaluator for FixedEvaluator {
    async fn evaluate(&self, metrics: &MetricMap) -> Result<SubfactorScores, EvaluationError> {
        self.seen
            .lock()
            .expect("evaluator mutex poisoned")
            .push(metrics.clone());
        Ok(self.scores.clone())
    }
}

/// Backfill that assigns a flat estimate to every null and also tries to
/// overwrite scored entries, which the service must ignore.
pub(super) struct FlatBackfill {
    pub(super) estimate: f64,
    pub(super) calls: AtomicUsize,
}

impl FlatBackfill {
    pub(super) fn new(estimate: f64) -> Self {
        Self {
            estimate,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IndustryBackfill for FlatBackfill {
    async fn backfill(&self, scores: &SubfactorScores) -> Result<SubfactorScores, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut filled = SubfactorScores::new();
        for (category, subfactors) in scores.iter() {
            for name in subfactors.keys() {
                filled.insert(category, name, Some(self.estimate));
            }
        }
        Ok(filled)
    }
}

/// Port that always fails the way an unreachable model would.
pub(super) struct BrokenEvaluator;

impl FormulaEvaluator for BrokenEvaluator {
    async fn evaluate(&self, _metrics: &MetricMap) -> Result<SubfactorScores, EvaluationError> {
        Err(EvaluationError::MalformedResponse {
            excerpt: "I'm sorry, I cannot help with that".to_string(),
        })
    }
}

impl IndustryBackfill for BrokenEvaluator {
    async fn backfill(&self, _scores: &SubfactorScores) -> Result<SubfactorScores, EvaluationError> {
        Err(EvaluationError::EmptyResponse)
    }
}

pub(super) fn evaluated_scores() -> SubfactorScores {
    SubfactorScores::new()
        .with(EsgCategory::Environmental, "GHG Score", Some(80.0))
        .with(EsgCategory::Environmental, "Energy Efficiency Score", None)
        .with(EsgCategory::Social, "Retention Score", Some(70.0))
        .with(EsgCategory::Social, "Safety Score", None)
}

pub(super) fn metrics() -> MetricMap {
    let mut metrics = MetricMap::new();
    metrics.insert(
        "Total GHG emissions (in tCO2)".to_string(),
        MetricValue::Number(285000.0),
    );
    metrics.insert(
        "Vehicles produced".to_string(),
        MetricValue::Number(100000.0),
    );
    metrics
}

pub(super) type TestService = EsgScoringService<FixedEvaluator, FlatBackfill>;

pub(super) fn build_service() -> (Arc<TestService>, Arc<FixedEvaluator>, Arc<FlatBackfill>) {
    let evaluator = Arc::new(FixedEvaluator::returning(evaluated_scores()));
    let backfill = Arc::new(FlatBackfill::new(55.0));
    let service = Arc::new(EsgScoringService::new(evaluator.clone(), backfill.clone()));
    (service, evaluator, backfill)
}

pub(super) fn router() -> axum::Router {
    let (service, _, _) = build_service();
    scoring_router(service)
}

pub(super) fn broken_router() -> axum::Router {
    let broken = Arc::new(BrokenEvaluator);
    scoring_router(Arc::new(EsgScoringService::new(broken.clone(), broken)))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn post_json(path: &str, body: &Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(path)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serializable body"),
        ))
        .expect("valid request")
}
