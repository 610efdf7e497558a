use serde_json::Value;

use super::domain::{CategorySubfactors, EsgCategory, MetricMap, MetricValue, SubfactorScores};

/// Structural problem found while converting untrusted JSON into scores.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeViolation {
    #[error("{field} must be a JSON object, found {found}")]
    NotAnObject { field: String, found: &'static str },
    #[error("unknown ESG category '{0}' (expected Environmental, Social, or Governance)")]
    UnknownCategory(String),
    #[error("score for {category} / '{subfactor}' must be a number or null, found {found}")]
    InvalidScore {
        category: EsgCategory,
        subfactor: String,
        found: &'static str,
    },
    #[error("metric '{metric}' must be a number or text, found {found}")]
    InvalidMetric { metric: String, found: &'static str },
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl SubfactorScores {
    /// Converts a `{ "Environmental": {..}, "Social": {..}, "Governance": {..} }`
    /// document into typed scores. Missing categories become empty mappings.
    pub fn from_json(field: &str, value: &Value) -> Result<Self, TypeViolation> {
        let object = value.as_object().ok_or_else(|| TypeViolation::NotAnObject {
            field: field.to_string(),
            found: kind(value),
        })?;

        let mut scores = SubfactorScores::new();
        for (label, subfactors) in object {
            let category = EsgCategory::from_label(label)
                .ok_or_else(|| TypeViolation::UnknownCategory(label.clone()))?;
            *scores.category_mut(category) = parse_category(category, subfactors)?;
        }

        Ok(scores)
    }
}

fn parse_category(category: EsgCategory, value: &Value) -> Result<CategorySubfactors, TypeViolation> {
    let object = value.as_object().ok_or_else(|| TypeViolation::NotAnObject {
        field: category.label().to_string(),
        found: kind(value),
    })?;

    let mut subfactors = CategorySubfactors::with_capacity(object.len());
    for (name, raw) in object {
        let score = match raw {
            Value::Null => None,
            Value::Number(number) => number.as_f64(),
            other => {
                return Err(TypeViolation::InvalidScore {
                    category,
                    subfactor: name.clone(),
                    found: kind(other),
                })
            }
        };
        subfactors.insert(name.clone(), score);
    }

    Ok(subfactors)
}

/// Converts the extracted `overall_data` object into a metric map.
///
/// Null metrics are dropped since they carry nothing for the evaluator.
pub fn metric_map_from_json(value: &Value) -> Result<MetricMap, TypeViolation> {
    let object = value.as_object().ok_or_else(|| TypeViolation::NotAnObject {
        field: "overall_data".to_string(),
        found: kind(value),
    })?;

    let mut metrics = MetricMap::with_capacity(object.len());
    for (name, raw) in object {
        let metric = match raw {
            Value::Null => continue,
            Value::Number(number) => match number.as_f64() {
                Some(number) => MetricValue::Number(number),
                None => continue,
            },
            Value::String(text) => MetricValue::Text(text.clone()),
            other => {
                return Err(TypeViolation::InvalidMetric {
                    metric: name.clone(),
                    found: kind(other),
                })
            }
        };
        metrics.insert(name.clone(), metric);
    }

    Ok(metrics)
}
