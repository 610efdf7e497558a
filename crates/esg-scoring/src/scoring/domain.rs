use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The three fixed ESG categories, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EsgCategory {
    Environmental,
    Social,
    Governance,
}

impl EsgCategory {
    pub const ALL: [EsgCategory; 3] = [
        EsgCategory::Environmental,
        EsgCategory::Social,
        EsgCategory::Governance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EsgCategory::Environmental => "Environmental",
            EsgCategory::Social => "Social",
            EsgCategory::Governance => "Governance",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == value)
    }
}

impl fmt::Display for EsgCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single extracted disclosure value. Most metrics are numeric; a few
/// (certifications, policy names) arrive as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

/// Flat metric name -> value mapping produced by document extraction.
pub type MetricMap = IndexMap<String, MetricValue>;

/// Sub-factor name -> score for one category. `None` means not computable.
pub type CategorySubfactors = IndexMap<String, Option<f64>>;

/// Sub-factor scores grouped by category.
///
/// The category key set is always exactly [`EsgCategory::ALL`]; a category
/// with no sub-factors is present with an empty mapping. Sub-factor order is
/// the order in which the scores were received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubfactorScores {
    #[serde(rename = "Environmental")]
    environmental: CategorySubfactors,
    #[serde(rename = "Social")]
    social: CategorySubfactors,
    #[serde(rename = "Governance")]
    governance: CategorySubfactors,
}

impl Default for SubfactorScores {
    fn default() -> Self {
        Self::new()
    }
}

impl SubfactorScores {
    pub fn new() -> Self {
        Self {
            environmental: CategorySubfactors::new(),
            social: CategorySubfactors::new(),
            governance: CategorySubfactors::new(),
        }
    }

    pub fn category(&self, category: EsgCategory) -> &CategorySubfactors {
        match category {
            EsgCategory::Environmental => &self.environmental,
            EsgCategory::Social => &self.social,
            EsgCategory::Governance => &self.governance,
        }
    }

    pub fn category_mut(&mut self, category: EsgCategory) -> &mut CategorySubfactors {
        match category {
            EsgCategory::Environmental => &mut self.environmental,
            EsgCategory::Social => &mut self.social,
            EsgCategory::Governance => &mut self.governance,
        }
    }

    /// Builder-style insert used by fixtures and adapters.
    pub fn with(mut self, category: EsgCategory, name: &str, score: Option<f64>) -> Self {
        self.insert(category, name, score);
        self
    }

    pub fn insert(&mut self, category: EsgCategory, name: &str, score: Option<f64>) {
        self.category_mut(category).insert(name.to_string(), score);
    }

    pub fn get(&self, category: EsgCategory, name: &str) -> Option<Option<f64>> {
        self.category(category).get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EsgCategory, &CategorySubfactors)> {
        EsgCategory::ALL
            .into_iter()
            .map(move |category| (category, self.category(category)))
    }

    /// Number of sub-factors still lacking a score, across all categories.
    pub fn missing_count(&self) -> usize {
        self.iter()
            .map(|(_, subfactors)| subfactors.values().filter(|score| score.is_none()).count())
            .sum()
    }

    pub fn has_missing(&self) -> bool {
        self.missing_count() > 0
    }
}
