use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregate::{aggregate_composite, category_weight, CompositeScore};
use super::domain::{EsgCategory, SubfactorScores};
use super::rating::ScoreStatus;

/// Breakdown of a scored submission suitable for API responses and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub generated_at: DateTime<Utc>,
    pub scores: CompositeScore,
    pub composite_status: ScoreStatus,
    pub categories: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub category: EsgCategory,
    pub weight: f64,
    pub score: f64,
    pub status: ScoreStatus,
    pub scored: usize,
    pub missing: usize,
    pub subfactors: Vec<SubfactorView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubfactorView {
    pub name: String,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScoreStatus>,
}

impl ScoreReport {
    pub fn build(scores: &SubfactorScores, generated_at: DateTime<Utc>) -> Self {
        let composite = aggregate_composite(scores);

        let categories = scores
            .iter()
            .map(|(category, subfactors)| {
                let views: Vec<SubfactorView> = subfactors
                    .iter()
                    .map(|(name, score)| SubfactorView {
                        name: name.clone(),
                        score: *score,
                        status: score.map(ScoreStatus::from_score),
                    })
                    .collect();
                let scored = views.iter().filter(|view| view.score.is_some()).count();
                let category_score = composite.category(category);

                CategoryBreakdown {
                    category,
                    weight: category_weight(category),
                    score: category_score,
                    status: ScoreStatus::from_score(category_score),
                    scored,
                    missing: views.len() - scored,
                    subfactors: views,
                }
            })
            .collect();

        Self {
            generated_at,
            composite_status: ScoreStatus::from_score(composite.composite),
            scores: composite,
            categories,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "ESG score: {:.2} ({})",
            self.scores.composite,
            self.composite_status.label()
        );
        let _ = writeln!(
            out,
            "Generated {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for breakdown in &self.categories {
            let _ = writeln!(
                out,
                "\n{} (weight {:.0}%): {:.2} ({}) | {} scored, {} missing",
                breakdown.category,
                breakdown.weight * 100.0,
                breakdown.score,
                breakdown.status.label(),
                breakdown.scored,
                breakdown.missing
            );
            for subfactor in &breakdown.subfactors {
                match (subfactor.score, subfactor.status) {
                    (Some(score), Some(status)) => {
                        let _ = writeln!(out, "- {}: {:.2} ({})", subfactor.name, score, status.label());
                    }
                    _ => {
                        let _ = writeln!(out, "- {}: n/a", subfactor.name);
                    }
                }
            }
        }

        out
    }

    /// Writes one `category,subfactor,score,status` row per sub-factor, plus a
    /// category total row with an empty sub-factor column.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["category", "subfactor", "score", "status"])?;

        for breakdown in &self.categories {
            for subfactor in &breakdown.subfactors {
                let score = subfactor
                    .score
                    .map(|score| score.to_string())
                    .unwrap_or_default();
                let status = subfactor.status.map(|status| status.label()).unwrap_or("");
                csv.write_record([
                    breakdown.category.label(),
                    subfactor.name.as_str(),
                    score.as_str(),
                    status,
                ])?;
            }
            csv.write_record([
                breakdown.category.label(),
                "",
                breakdown.score.to_string().as_str(),
                breakdown.status.label(),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }
}
