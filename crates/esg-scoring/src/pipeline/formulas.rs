//! Formula sheet handed to the evaluator, calibrated for automotive
//! manufacturing. Benchmarks are industry reference values; a metric at the
//! benchmark scores 100 on "lower is better" formulas.

use std::fmt::Write as _;

use crate::scoring::{EsgCategory, MetricMap, SubfactorScores};

pub const GHG_INTENSITY_BENCHMARK: f64 = 2.85; // tCO2e per vehicle
pub const ENERGY_INTENSITY_BENCHMARK: f64 = 3150.0; // MWh per 1000 vehicles
pub const WATER_INTENSITY_BENCHMARK: f64 = 3.85; // m3 per vehicle
pub const TURNOVER_BENCHMARK_PCT: f64 = 15.0; // % per year
pub const INJURY_RATE_BENCHMARK: f64 = 3.85; // per 100k hours worked
pub const CEO_PAY_RATIO_BENCHMARK: f64 = 200.0; // x median employee pay
pub const TRAINING_HOURS_BENCHMARK: f64 = 40.0; // hours per employee per year
pub const COMMUNITY_INVESTMENT_BENCHMARK_PCT: f64 = 1.0; // % of pre-tax profit

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubfactorFormula {
    pub category: EsgCategory,
    pub name: &'static str,
    /// Formula text; `{benchmark}` is replaced by `benchmark` when rendered.
    pub formula: &'static str,
    pub benchmark: Option<f64>,
}

impl SubfactorFormula {
    pub fn render(&self) -> String {
        match self.benchmark {
            Some(benchmark) => self.formula.replace("{benchmark}", &benchmark.to_string()),
            None => self.formula.to_string(),
        }
    }
}

const fn formula(
    category: EsgCategory,
    name: &'static str,
    formula: &'static str,
) -> SubfactorFormula {
    SubfactorFormula {
        category,
        name,
        formula,
        benchmark: None,
    }
}

const fn benchmarked(
    category: EsgCategory,
    name: &'static str,
    formula: &'static str,
    benchmark: f64,
) -> SubfactorFormula {
    SubfactorFormula {
        category,
        name,
        formula,
        benchmark: Some(benchmark),
    }
}

pub const FORMULAS: [SubfactorFormula; 22] = [
    benchmarked(
        EsgCategory::Environmental,
        "GHG Score",
        "min(100, 100 * {benchmark} / (total GHG emissions in tCO2e / vehicles produced))",
        GHG_INTENSITY_BENCHMARK,
    ),
    benchmarked(
        EsgCategory::Environmental,
        "Energy Efficiency Score",
        "min(100, 100 * {benchmark} / (total energy consumption in MWh / (vehicles produced / 1000)))",
        ENERGY_INTENSITY_BENCHMARK,
    ),
    benchmarked(
        EsgCategory::Environmental,
        "Water Efficiency Score",
        "min(100, 100 * {benchmark} / (total water withdrawal in m3 / vehicles produced))",
        WATER_INTENSITY_BENCHMARK,
    ),
    formula(
        EsgCategory::Environmental,
        "Waste Recycling Score",
        "waste recycled or reused / total waste generated * 100",
    ),
    formula(
        EsgCategory::Environmental,
        "Compliance Score",
        "max(0, 100 - 20 * number of environmental violations or fines in the year)",
    ),
    formula(
        EsgCategory::Environmental,
        "Renewable Energy Score",
        "renewable energy consumed / total energy consumed * 100",
    ),
    formula(
        EsgCategory::Environmental,
        "Biodiversity Score",
        "100 if a biodiversity policy exists and no operations sit in protected areas, 50 if only one holds, else 0",
    ),
    formula(
        EsgCategory::Environmental,
        "Climate Risk Management Score",
        "25 * number of TCFD pillars disclosed (governance, strategy, risk management, metrics and targets)",
    ),
    benchmarked(
        EsgCategory::Social,
        "Retention Score",
        "min(100, 100 * {benchmark} / annual employee turnover rate in %)",
        TURNOVER_BENCHMARK_PCT,
    ),
    benchmarked(
        EsgCategory::Social,
        "Safety Score",
        "min(100, 100 * {benchmark} / recordable injuries per 100,000 hours worked)",
        INJURY_RATE_BENCHMARK,
    ),
    formula(
        EsgCategory::Social,
        "Diversity Score",
        "min(100, 2 * percentage of women in the total workforce)",
    ),
    benchmarked(
        EsgCategory::Social,
        "Community Investment Score",
        "min(100, 100 * (community investment / pre-tax profit * 100) / {benchmark})",
        COMMUNITY_INVESTMENT_BENCHMARK_PCT,
    ),
    formula(
        EsgCategory::Social,
        "Customer Satisfaction Score",
        "Net Promoter Score as reported (range -100 to 100)",
    ),
    formula(
        EsgCategory::Social,
        "Human Rights Score",
        "max(0, percentage of tier-1 suppliers audited for human rights - 25 * confirmed human rights incidents)",
    ),
    benchmarked(
        EsgCategory::Social,
        "Training Score",
        "min(100, 100 * average training hours per employee / {benchmark})",
        TRAINING_HOURS_BENCHMARK,
    ),
    formula(
        EsgCategory::Governance,
        "Board Independence Score",
        "independent directors / total directors * 100",
    ),
    benchmarked(
        EsgCategory::Governance,
        "Compensation Alignment Score",
        "min(100, 100 * {benchmark} / CEO-to-median-employee pay ratio)",
        CEO_PAY_RATIO_BENCHMARK,
    ),
    formula(
        EsgCategory::Governance,
        "Audit Committee Score",
        "independent audit committee members / total audit committee members * 100",
    ),
    formula(
        EsgCategory::Governance,
        "Shareholder Rights Score",
        "100 - 25 * count of (dual-class shares, poison pill, staggered board, no proxy access)",
    ),
    formula(
        EsgCategory::Governance,
        "Transparency Score",
        "percentage of applicable GRI/SASB disclosures reported",
    ),
    formula(
        EsgCategory::Governance,
        "Anti-Corruption Score",
        "max(0, percentage of employees trained on anti-corruption - 25 * confirmed corruption incidents)",
    ),
    formula(
        EsgCategory::Governance,
        "Tax Transparency Score",
        "percentage of revenue covered by public country-by-country tax reporting",
    ),
];

pub fn formulas_for(category: EsgCategory) -> impl Iterator<Item = &'static SubfactorFormula> {
    FORMULAS
        .iter()
        .filter(move |formula| formula.category == category)
}

pub const SYSTEM_PROMPT: &str = "You are an ESG analyst for the automotive manufacturing sector. \
Answer with a single JSON object and nothing else.";

fn output_contract(out: &mut String) {
    out.push_str(
        "\nRespond with JSON shaped exactly as \
{\"Environmental\": {\"<sub-factor>\": number|null}, \"Social\": {...}, \"Governance\": {...}}. \
Use the sub-factor names listed above. Do not wrap numbers in strings.\n",
    );
}

/// Prompt asking the evaluator to apply the formula sheet to `metrics`.
pub fn formula_prompt(metrics: &MetricMap) -> String {
    let mut out = String::from(
        "Compute each ESG sub-factor score from the company metrics below using the given formulas. \
If a formula's inputs are missing, return null for that sub-factor; never guess.\n\nFormulas:\n",
    );

    for category in EsgCategory::ALL {
        let _ = writeln!(out, "{category}:");
        for formula in formulas_for(category) {
            let _ = writeln!(out, "- {}: {}", formula.name, formula.render());
        }
    }

    let metrics_json = serde_json::to_string_pretty(metrics).unwrap_or_else(|_| "{}".to_string());
    let _ = write!(out, "\nCompany metrics:\n{metrics_json}\n");
    output_contract(&mut out);
    out
}

/// Prompt asking the evaluator to fill only the null scores in `scores`.
pub fn backfill_prompt(scores: &SubfactorScores) -> String {
    let scores_json = serde_json::to_string_pretty(scores).unwrap_or_else(|_| "{}".to_string());
    let mut out = String::from(
        "The ESG sub-factor scores below were computed from a supplier's disclosures. \
Replace every null with the typical score of an automotive manufacturing company for that sub-factor, \
on the same scale as the formulas that produce it. Return every non-null score exactly as given.\n\n",
    );
    let _ = write!(out, "Scores:\n{scores_json}\n");
    output_contract(&mut out);
    out
}
