use serde::{Deserialize, Serialize};

use super::domain::{CategorySubfactors, EsgCategory, SubfactorScores};

/// Category weights for the automotive manufacturing vertical.
pub const ENVIRONMENTAL_WEIGHT: f64 = 0.40;
pub const SOCIAL_WEIGHT: f64 = 0.35;
pub const GOVERNANCE_WEIGHT: f64 = 0.25;

pub fn category_weight(category: EsgCategory) -> f64 {
    match category {
        EsgCategory::Environmental => ENVIRONMENTAL_WEIGHT,
        EsgCategory::Social => SOCIAL_WEIGHT,
        EsgCategory::Governance => GOVERNANCE_WEIGHT,
    }
}

/// Category scores plus the weighted composite, all rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    #[serde(rename = "E_score")]
    pub environmental: f64,
    #[serde(rename = "S_score")]
    pub social: f64,
    #[serde(rename = "G_score")]
    pub governance: f64,
    #[serde(rename = "ESG_score")]
    pub composite: f64,
}

impl CompositeScore {
    pub fn category(&self, category: EsgCategory) -> f64 {
        match category {
            EsgCategory::Environmental => self.environmental,
            EsgCategory::Social => self.social,
            EsgCategory::Governance => self.governance,
        }
    }
}

/// Rounds the exact binary value of `value` to 2 decimal places, ties to
/// even. Scaling by 100 in floating point first would round twice.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let bits = value.to_bits();
    let negative = bits >> 63 == 1;
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1_u64 << 52) - 1);
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1_u64 << 52), biased_exponent - 1075)
    };

    // Integral already.
    if exponent >= 0 {
        return value;
    }

    // |value| * 100 == scaled / 2^shift exactly; scaled < 2^60.
    let scaled = u128::from(mantissa) * 100;
    let shift = exponent.unsigned_abs();
    let hundredths = if shift >= 64 {
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled & ((1_u128 << shift) - 1);
        let half = 1_u128 << (shift - 1);
        if remainder > half || (remainder == half && quotient & 1 == 1) {
            quotient + 1
        } else {
            quotient
        }
    };

    let rounded = hundredths as f64 / 100.0;
    if negative {
        -rounded
    } else {
        rounded
    }
}

/// Mean of the scored sub-factors, rounded to 2 decimals.
///
/// Unscored (`None`) and non-finite entries are skipped rather than counted
/// as zero. A category with nothing scored yields exactly `0.0`.
pub fn aggregate_category(scores: &CategorySubfactors) -> f64 {
    let mut sum = 0.0_f64;
    let mut count = 0usize;
    for score in scores.values().filter_map(|score| *score) {
        if !score.is_finite() {
            continue;
        }
        sum += score;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    round2(sum / count as f64)
}

/// Reduces sub-factor scores to the three category scores and the weighted
/// composite. The composite is computed from the already-rounded category
/// scores and then rounded again.
pub fn aggregate_composite(scores: &SubfactorScores) -> CompositeScore {
    let environmental = aggregate_category(scores.category(EsgCategory::Environmental));
    let social = aggregate_category(scores.category(EsgCategory::Social));
    let governance = aggregate_category(scores.category(EsgCategory::Governance));

    let composite = round2(
        ENVIRONMENTAL_WEIGHT * environmental
            + SOCIAL_WEIGHT * social
            + GOVERNANCE_WEIGHT * governance,
    );

    CompositeScore {
        environmental,
        social,
        governance,
        composite,
    }
}
