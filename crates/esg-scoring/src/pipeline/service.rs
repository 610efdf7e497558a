use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::ports::{EvaluationError, FormulaEvaluator, IndustryBackfill};
use crate::scoring::{
    aggregate_composite, CompositeScore, MetricMap, ScoreReport, SubfactorScores, TypeViolation,
};

/// Service composing the formula evaluator, the industry-average backfill,
/// and the deterministic aggregator.
pub struct EsgScoringService<F, B> {
    evaluator: Arc<F>,
    backfill: Arc<B>,
}

impl<F, B> EsgScoringService<F, B>
where
    F: FormulaEvaluator + 'static,
    B: IndustryBackfill + 'static,
{
    pub fn new(evaluator: Arc<F>, backfill: Arc<B>) -> Self {
        Self {
            evaluator,
            backfill,
        }
    }

    /// Apply the formula sheet to extracted metrics.
    pub async fn score_subfactors(
        &self,
        metrics: &MetricMap,
    ) -> Result<SubfactorScores, ScoringServiceError> {
        if metrics.is_empty() {
            return Err(ScoringServiceError::EmptyMetrics);
        }

        let scores = self.evaluator.evaluate(metrics).await?;
        info!(
            metrics = metrics.len(),
            missing = scores.missing_count(),
            "sub-factor scores evaluated"
        );
        Ok(scores)
    }

    /// Fill unscored sub-factors with industry averages. Scored values always
    /// survive unchanged.
    pub async fn fill_missing(
        &self,
        scores: SubfactorScores,
    ) -> Result<SubfactorScores, ScoringServiceError> {
        if !scores.has_missing() {
            return Ok(scores);
        }

        let estimates = self.backfill.backfill(&scores).await?;
        let merged = merge_backfill(scores, &estimates);
        info!(
            still_missing = merged.missing_count(),
            "industry-average backfill applied"
        );
        Ok(merged)
    }

    /// Reduce final sub-factor scores to category scores and the composite.
    pub fn finalize(&self, scores: &SubfactorScores) -> CompositeScore {
        aggregate_composite(scores)
    }

    /// Run evaluation, backfill, and aggregation end to end.
    pub async fn run(&self, metrics: &MetricMap) -> Result<ScoreReport, ScoringServiceError> {
        let scores = self.score_subfactors(metrics).await?;
        let scores = self.fill_missing(scores).await?;
        Ok(ScoreReport::build(&scores, Utc::now()))
    }
}

/// Combines original scores with backfill estimates: nulls take the estimate,
/// scored values are kept, sub-factors new to the estimate are appended.
pub fn merge_backfill(original: SubfactorScores, estimates: &SubfactorScores) -> SubfactorScores {
    let mut merged = original;

    for (category, estimated) in estimates.iter() {
        let target = merged.category_mut(category);
        for (name, estimate) in estimated {
            match target.get_mut(name) {
                Some(slot) => match *slot {
                    None => *slot = *estimate,
                    Some(kept) => {
                        if *estimate != Some(kept) {
                            warn!(
                                %category,
                                subfactor = %name,
                                kept,
                                "backfill attempted to overwrite a scored sub-factor"
                            );
                        }
                    }
                },
                None => {
                    target.insert(name.clone(), *estimate);
                }
            }
        }
    }

    merged
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error("no metrics were supplied for evaluation")]
    EmptyMetrics,
    #[error(transparent)]
    Validation(#[from] TypeViolation),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
