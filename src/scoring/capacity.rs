//! Giving-capacity scoring.
//!
//! Liquidity and profitability drive the score; revenue is deliberately ignored
//! because it says nothing about cash on hand. Each input is divided by its
//! reference denominator (billions of USD by default) and weighted:
//!
//! `score = w_cash * cash / ref_cash + w_ni * net_income / ref_ni`
//!
//! With cash unavailable the net-income term alone is used and capped at
//! `net_income_only_ceiling`. Any missing input marks the result low-confidence.

use crate::config::CapacityConfig;
use crate::domain::{CapacityInputs, CapacityRating, CapacityScore, FinancialSnapshot};

/// Score a snapshot. Pure: the same snapshot and config always give the same result.
pub fn score_capacity(snapshot: &FinancialSnapshot, config: &CapacityConfig) -> CapacityScore {
    let inputs = CapacityInputs {
        cash: snapshot.cash_and_equivalents.value(),
        net_income: snapshot.net_income.value(),
        total_assets: snapshot.total_assets.value(),
    };

    let cash_term = inputs.cash.map(|c| config.cash_weight * c / config.cash_reference);
    let income_term = inputs
        .net_income
        .map(|ni| config.net_income_weight * ni / config.net_income_reference);

    let raw = match (cash_term, income_term) {
        (Some(cash), Some(income)) => cash + income,
        (Some(cash), None) => cash,
        (None, Some(income)) => income.min(config.net_income_only_ceiling),
        (None, None) => 0.0,
    };
    // Losses can pull the score down, but never below zero.
    let score = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
    let low_confidence = inputs.cash.is_none() || inputs.net_income.is_none();

    CapacityScore {
        score,
        rating: rate(score, config),
        rationale: rationale(&inputs),
        inputs,
        low_confidence,
    }
}

/// Map a score to its tier. Thresholds are inclusive lower bounds.
pub fn rate(score: f64, config: &CapacityConfig) -> CapacityRating {
    if score >= config.major_threshold {
        CapacityRating::Major
    } else if config.leadership_threshold.is_some_and(|t| score >= t) {
        CapacityRating::Leadership
    } else if score >= config.principal_threshold {
        CapacityRating::Principal
    } else {
        CapacityRating::Standard
    }
}

fn rationale(inputs: &CapacityInputs) -> Vec<String> {
    let line = |label: &str, value: Option<f64>, missing: &str| match value {
        Some(v) => format!("{label}: ${:.1}B", v / 1e9),
        None => missing.to_string(),
    };
    vec![
        line("Cash position", inputs.cash, "Cash data unavailable"),
        line("Net income", inputs.net_income, "Net income data unavailable"),
        line("Total assets", inputs.total_assets, "Assets data unavailable"),
    ]
}
