//! Mission-alignment assessment against a configured cause profile.

use crate::config::{AlignmentConfig, AlignmentRule, RuleTarget};
use crate::domain::{AlignmentAssessment, AlignmentLevel, CompanyIdentity};

/// Assess how well a company's activity matches the cause.
///
/// Every matching rule contributes its factor and weight, in rule order. A rule
/// counts once no matter how many of its keywords hit.
pub fn assess_alignment(identity: &CompanyIdentity, config: &AlignmentConfig) -> AlignmentAssessment {
    let sector_text = [identity.sic_description.as_deref(), identity.description.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let location_text = [identity.city.as_deref(), identity.state.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut factors = Vec::new();
    let mut score = 0.0;
    for rule in &config.rules {
        let haystack = match rule.target {
            RuleTarget::Sector => &sector_text,
            RuleTarget::Location => &location_text,
        };
        if rule_matches(rule, haystack) {
            tracing::debug!(ticker = %identity.ticker, rule = %rule.name, "alignment rule matched");
            factors.push(rule.factor.clone());
            score += rule.weight;
        }
    }

    AlignmentAssessment {
        level: level_for(score, config),
        score,
        factors,
    }
}

fn rule_matches(rule: &AlignmentRule, haystack: &str) -> bool {
    !haystack.is_empty()
        && rule
            .keywords
            .iter()
            .any(|k| haystack.contains(&k.trim().to_lowercase()))
}

/// Map a raw alignment score to its level. Thresholds are inclusive lower bounds.
pub fn level_for(score: f64, config: &AlignmentConfig) -> AlignmentLevel {
    if score >= config.high_threshold {
        AlignmentLevel::High
    } else if score >= config.medium_threshold {
        AlignmentLevel::Medium
    } else if score >= config.low_threshold {
        AlignmentLevel::Low
    } else {
        AlignmentLevel::None
    }
}
