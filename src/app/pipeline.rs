//! Shared "research pipeline" logic used by every CLI command that scores companies.
//!
//! Per company, strictly in sequence:
//! fetch raw records -> normalize -> capacity + alignment -> assemble
//!
//! Upstream failures never abort the batch. A missing record degrades the
//! profile (and is noted in its issues); a blank ticker skips just that company.

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::config::{CompanyConfig, ResearchConfig};
use crate::data::{FilingSource, LiveSource};
use crate::domain::{ProspectProfile, SkippedCompany};
use crate::error::AppError;
use crate::normalize::{
    FoundationMatch, foundation_search_terms, normalize_foundation, normalize_identity, normalize_snapshot,
    select_foundation,
};
use crate::profile::{ProfileParts, assemble_profile};
use crate::report::rank_profiles;
use crate::scoring::{assess_alignment, score_capacity};

/// All computed outputs of a single research run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// In configuration order; use `ranked()` for priority order.
    pub profiles: Vec<ProspectProfile>,
    pub skipped: Vec<SkippedCompany>,
    pub researched_at: DateTime<Local>,
}

impl RunOutput {
    pub fn ranked(&self) -> Vec<&ProspectProfile> {
        rank_profiles(&self.profiles)
    }
}

/// Execute a research run against the live SEC / ProPublica sources.
pub fn run_research(config: &ResearchConfig) -> Result<RunOutput, AppError> {
    let source = LiveSource::from_config(&config.source)?;
    Ok(run_research_with_source(config, &source))
}

/// Execute a research run against any filing source.
///
/// Always completes: every company either yields a profile or lands in `skipped`.
pub fn run_research_with_source(config: &ResearchConfig, source: &impl FilingSource) -> RunOutput {
    let researched_at = Local::now();
    let mut profiles = Vec::with_capacity(config.companies.len());
    let mut skipped = Vec::new();

    tracing::info!(companies = config.companies.len(), "starting prospect research");

    for company in &config.companies {
        match research_company(company, config, source, researched_at) {
            Ok(profile) => {
                tracing::info!(
                    ticker = %profile.ticker,
                    score = profile.capacity.score,
                    rating = profile.capacity.rating.label(),
                    alignment = profile.alignment.level.label(),
                    low_confidence = profile.capacity.low_confidence,
                    facts = profile.snapshot.present_count(),
                    "profile assembled"
                );
                profiles.push(profile);
            }
            Err(err) => {
                tracing::warn!(company = %company.name, error = %err, "skipping company");
                skipped.push(SkippedCompany {
                    company: company.name.clone(),
                    reason: err.message().to_string(),
                });
            }
        }
    }

    tracing::info!(profiles = profiles.len(), skipped = skipped.len(), "research complete");

    RunOutput {
        profiles,
        skipped,
        researched_at,
    }
}

/// Research one company. Errors only for an invalid identity.
pub fn research_company(
    company: &CompanyConfig,
    config: &ResearchConfig,
    source: &impl FilingSource,
    researched_at: DateTime<Local>,
) -> Result<ProspectProfile, AppError> {
    let raw = if company.ticker.trim().is_empty() {
        RawRecords::default()
    } else {
        tracing::info!(ticker = %company.ticker, name = %company.name, "researching company");
        collect_raw(company, source)
    };

    let identity = normalize_identity(company, raw.metadata.as_ref());
    let snapshot = normalize_snapshot(raw.facts.as_ref(), &config.taxonomy);
    let foundation = raw
        .foundation
        .as_ref()
        .map(|(found, detail)| normalize_foundation(found, detail.as_ref()));

    let capacity = score_capacity(&snapshot, &config.capacity);
    let alignment = assess_alignment(&identity, &config.alignment);

    assemble_profile(
        ProfileParts {
            identity,
            snapshot,
            foundation,
            capacity,
            alignment,
            issues: raw.issues,
        },
        researched_at,
    )
}

/// Raw upstream records for one company, with whatever could not be fetched.
#[derive(Debug, Default)]
struct RawRecords {
    metadata: Option<Value>,
    facts: Option<Value>,
    foundation: Option<(FoundationMatch, Option<Value>)>,
    issues: Vec<String>,
}

fn collect_raw(company: &CompanyConfig, source: &impl FilingSource) -> RawRecords {
    let ticker = company.ticker.trim();
    let mut raw = RawRecords::default();

    raw.metadata = fetch(&mut raw.issues, "company metadata", || source.company_metadata(ticker));
    raw.facts = fetch(&mut raw.issues, "financial facts", || source.company_facts(ticker));

    for term in foundation_search_terms(&company.name) {
        let Some(results) = fetch(&mut raw.issues, "foundation search", || source.search_foundations(&term)) else {
            continue;
        };
        if let Some(found) = select_foundation(&results, &company.name) {
            tracing::info!(ticker, foundation = %found.name, ein = %found.ein, "found affiliated foundation");
            let detail = fetch(&mut raw.issues, "foundation filings", || source.foundation_filing(&found.ein));
            raw.foundation = Some((found, detail));
            break;
        }
    }
    if raw.foundation.is_none() {
        tracing::info!(ticker, "no affiliated foundation found");
    }

    raw
}

fn fetch(issues: &mut Vec<String>, what: &str, call: impl FnOnce() -> Result<Value, AppError>) -> Option<Value> {
    match call() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(record = what, error = %err, "source unavailable; degrading");
            issues.push(format!("{what}: {err}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use serde_json::json;

    use crate::domain::{AlignmentLevel, CapacityRating};

    /// Canned responses keyed by ticker / query / EIN. Anything else is unavailable.
    #[derive(Default)]
    struct FixtureSource {
        metadata: Vec<(&'static str, Value)>,
        facts: Vec<(&'static str, Value)>,
        searches: Vec<(&'static str, Value)>,
        filings: Vec<(&'static str, Value)>,
        calls: RefCell<Vec<String>>,
    }

    fn lookup(table: &[(&'static str, Value)], key: &str) -> Result<Value, AppError> {
        table
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| AppError::unavailable(format!("no fixture for {key}")))
    }

    impl FilingSource for FixtureSource {
        fn company_metadata(&self, ticker: &str) -> Result<Value, AppError> {
            self.calls.borrow_mut().push(format!("meta:{ticker}"));
            lookup(&self.metadata, ticker)
        }
        fn company_facts(&self, ticker: &str) -> Result<Value, AppError> {
            self.calls.borrow_mut().push(format!("facts:{ticker}"));
            lookup(&self.facts, ticker)
        }
        fn search_foundations(&self, query: &str) -> Result<Value, AppError> {
            self.calls.borrow_mut().push(format!("search:{query}"));
            lookup(&self.searches, query)
        }
        fn foundation_filing(&self, ein: &str) -> Result<Value, AppError> {
            self.calls.borrow_mut().push(format!("filing:{ein}"));
            lookup(&self.filings, ein)
        }
    }

    fn annual(val: f64) -> Value {
        json!({"USD": [{"val": val, "end": "2024-12-31", "filed": "2025-02-27", "form": "10-K"}]})
    }

    fn fixture() -> FixtureSource {
        FixtureSource {
            metadata: vec![(
                "UNH",
                json!({"name": "UNITEDHEALTH GROUP INC", "sicDescription": "Hospital & Medical Service Plans",
                       "stateOfIncorporation": "DE", "cik": "731766"}),
            )],
            facts: vec![(
                "UNH",
                json!({"facts": {"us-gaap": {
                    "NetIncomeLoss": {"units": annual(14_405_000_000.0)},
                    "CashAndCashEquivalentsAtCarryingValue": {"units": annual(25_312_000_000.0)}
                }}}),
            )],
            searches: vec![(
                "UnitedHealth foundation",
                json!({"organizations": [{"name": "UNITEDHEALTH FOUNDATION", "ein": 411807038}]}),
            )],
            filings: vec![(
                "411807038",
                json!({"organization": {"asset_amount": 100_000_000},
                       "filings_with_data": [{"tax_prd_yr": 2023, "contrpdpbks": 60_000_000}]}),
            )],
            calls: RefCell::new(Vec::new()),
        }
    }

    fn config(companies: Vec<CompanyConfig>) -> ResearchConfig {
        ResearchConfig {
            companies,
            ..ResearchConfig::default()
        }
    }

    #[test]
    fn full_records_produce_major_profile() {
        let source = fixture();
        let cfg = config(vec![CompanyConfig::new("UNH", "UnitedHealth Group", "Minnetonka")]);
        let run = run_research_with_source(&cfg, &source);

        assert!(run.skipped.is_empty());
        let unh = &run.profiles[0];
        assert_eq!(unh.capacity.rating, CapacityRating::Major);
        assert_eq!(unh.alignment.level, AlignmentLevel::High);
        let foundation = unh.foundation.as_ref().unwrap();
        assert_eq!(foundation.grants_paid, Some(60_000_000.0));
        // The first search term missed, the second matched.
        assert_eq!(
            source.calls.borrow().iter().filter(|c| c.starts_with("search:")).count(),
            2
        );
        assert_eq!(unh.issues.len(), 1);
    }

    #[test]
    fn unavailable_sources_degrade_instead_of_failing() {
        let source = FixtureSource::default();
        let cfg = config(vec![CompanyConfig::new("TGT", "Target Corporation", "Minneapolis")]);
        let run = run_research_with_source(&cfg, &source);

        let tgt = &run.profiles[0];
        assert_eq!(tgt.identity.name, "Target Corporation");
        assert_eq!(tgt.snapshot.present_count(), 0);
        assert!(tgt.foundation.is_none());
        assert!(tgt.capacity.low_confidence);
        assert_eq!(tgt.capacity.score, 0.0);
        // metadata, facts, two searches
        assert_eq!(tgt.issues.len(), 4);
    }

    #[test]
    fn blank_ticker_is_skipped_without_fetching() {
        let source = fixture();
        let cfg = config(vec![
            CompanyConfig::new("  ", "Nameless Co", "Duluth"),
            CompanyConfig::new("UNH", "UnitedHealth Group", "Minnetonka"),
        ]);
        let run = run_research_with_source(&cfg, &source);

        assert_eq!(run.profiles.len(), 1);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].company, "Nameless Co");
        assert!(!source.calls.borrow().iter().any(|c| c.contains("Nameless")));
    }

    #[test]
    fn company_missing_ticker_key_is_skipped_and_batch_continues() {
        let source = fixture();
        let cfg = ResearchConfig::from_toml_str(
            r#"
            [[companies]]
            name = "Nameless Co"
            city = "Duluth"

            [[companies]]
            ticker = "UNH"
            name = "UnitedHealth Group"
            city = "Minnetonka"
            "#,
        )
        .unwrap();
        let run = run_research_with_source(&cfg, &source);

        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].company, "Nameless Co");
        assert_eq!(run.profiles.len(), 1);
        assert_eq!(run.profiles[0].ticker, "UNH");
        assert!(!source.calls.borrow().iter().any(|c| c == "meta:"));
    }
}
