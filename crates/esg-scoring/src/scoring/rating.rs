use serde::{Deserialize, Serialize};

/// Qualitative band shown next to a sub-factor or category score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            ScoreStatus::Excellent
        } else if score >= 70.0 {
            ScoreStatus::Good
        } else if score >= 50.0 {
            ScoreStatus::Fair
        } else {
            ScoreStatus::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreStatus::Excellent => "excellent",
            ScoreStatus::Good => "good",
            ScoreStatus::Fair => "fair",
            ScoreStatus::Poor => "poor",
        }
    }
}
