//! Deterministic ESG score reduction: sub-factor scores in, category scores
//! and the weighted composite out.

pub mod aggregate;
pub mod domain;
pub mod rating;
pub mod report;
pub mod validation;

pub use aggregate::{
    aggregate_category, aggregate_composite, category_weight, round2, CompositeScore,
    ENVIRONMENTAL_WEIGHT, GOVERNANCE_WEIGHT, SOCIAL_WEIGHT,
};
pub use domain::{CategorySubfactors, EsgCategory, MetricMap, MetricValue, SubfactorScores};
pub use rating::ScoreStatus;
pub use report::{CategoryBreakdown, ScoreReport, SubfactorView};
pub use validation::{metric_map_from_json, TypeViolation};
