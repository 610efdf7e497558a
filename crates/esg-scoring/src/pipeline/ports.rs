use std::future::Future;

use crate::scoring::{MetricMap, SubfactorScores, TypeViolation};

/// Turns extracted disclosure metrics into sub-factor scores using the fixed
/// formula sheet. Scores that cannot be computed come back as `None`.
pub trait FormulaEvaluator: Send + Sync {
    fn evaluate(
        &self,
        metrics: &MetricMap,
    ) -> impl Future<Output = Result<SubfactorScores, EvaluationError>> + Send;
}

/// Replaces unscored sub-factors with industry-average estimates.
///
/// Implementations should return scored values unchanged; the service
/// enforces this regardless.
pub trait IndustryBackfill: Send + Sync {
    fn backfill(
        &self,
        scores: &SubfactorScores,
    ) -> impl Future<Output = Result<SubfactorScores, EvaluationError>> + Send;
}

/// Failure talking to, or interpreting, an evaluation collaborator.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("evaluator is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("evaluator request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("evaluator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("evaluator returned an empty response")]
    EmptyResponse,
    #[error("evaluator response was not valid JSON: {excerpt}")]
    MalformedResponse { excerpt: String },
    #[error("evaluator response had the wrong shape: {0}")]
    InvalidShape(#[from] TypeViolation),
}
