//! Evaluation pipeline: formula evaluation and industry-average backfill
//! behind swappable ports, composed with the deterministic aggregator.

pub mod formulas;
pub mod llm;
pub mod ports;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use llm::{parse_json_payload, strip_code_fences, LlmClient};
pub use ports::{EvaluationError, FormulaEvaluator, IndustryBackfill};
pub use router::scoring_router;
pub use service::{merge_backfill, EsgScoringService, ScoringServiceError};
