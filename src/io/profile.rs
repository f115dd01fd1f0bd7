//! Read/write prospect profile JSON files.
//!
//! The per-company schema is consumed by CRM imports, so field names and nesting
//! are fixed:
//!
//! ```text
//! { "ticker", "company": {name, sic_description, state},
//!   "financials": {<metric>: {value, period_end} | null},
//!   "capacity": {score, rating}, "alignment": {level, factors} }
//! ```
//!
//! The combined run file wraps the ranked profiles with run metadata.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{AlignmentLevel, CapacityRating, FactValue, Metric, ProspectProfile, SkippedCompany};
use crate::error::AppError;

pub const COMBINED_FILE_NAME: &str = "prospects_combined.json";
pub const DATA_SOURCES: [&str; 2] = ["SEC EDGAR", "ProPublica Nonprofit Explorer"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub ticker: String,
    pub company: CompanyRecord,
    pub financials: FinancialsRecord,
    pub capacity: CapacityRecord,
    pub alignment: AlignmentRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub sic_description: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub value: f64,
    pub period_end: NaiveDate,
}

/// Unavailable facts serialize as `null`, never as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialsRecord {
    pub revenue: Option<FactRecord>,
    pub net_income: Option<FactRecord>,
    pub total_assets: Option<FactRecord>,
    pub cash_and_equivalents: Option<FactRecord>,
    pub stockholders_equity: Option<FactRecord>,
}

impl FinancialsRecord {
    pub fn get(&self, metric: Metric) -> Option<&FactRecord> {
        match metric {
            Metric::Revenue => self.revenue.as_ref(),
            Metric::NetIncome => self.net_income.as_ref(),
            Metric::TotalAssets => self.total_assets.as_ref(),
            Metric::CashAndEquivalents => self.cash_and_equivalents.as_ref(),
            Metric::StockholdersEquity => self.stockholders_equity.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRecord {
    pub score: f64,
    pub rating: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub level: String,
    pub factors: Vec<String>,
}

fn fact_record(value: &FactValue) -> Option<FactRecord> {
    value.fact().map(|f| FactRecord {
        value: f.value,
        period_end: f.period_end,
    })
}

impl From<&ProspectProfile> for ProfileRecord {
    fn from(profile: &ProspectProfile) -> Self {
        let snapshot = &profile.snapshot;
        Self {
            ticker: profile.ticker.clone(),
            company: CompanyRecord {
                name: profile.identity.name.clone(),
                sic_description: profile.identity.sector_label().to_string(),
                state: profile.identity.state.clone().unwrap_or_default(),
            },
            financials: FinancialsRecord {
                revenue: fact_record(&snapshot.revenue),
                net_income: fact_record(&snapshot.net_income),
                total_assets: fact_record(&snapshot.total_assets),
                cash_and_equivalents: fact_record(&snapshot.cash_and_equivalents),
                stockholders_equity: fact_record(&snapshot.stockholders_equity),
            },
            capacity: CapacityRecord {
                score: profile.capacity.score,
                rating: profile.capacity.rating.label().to_string(),
            },
            alignment: AlignmentRecord {
                level: profile.alignment.level.label().to_string(),
                factors: profile.alignment.factors.clone(),
            },
        }
    }
}

/// The whole run in one file, profiles in priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedReport {
    pub analysis_date: DateTime<Local>,
    pub companies_analyzed: usize,
    pub data_sources: Vec<String>,
    /// Tickers whose capacity score rests on incomplete inputs.
    pub low_confidence: Vec<String>,
    pub skipped: Vec<SkippedCompany>,
    pub results: Vec<ProfileRecord>,
}

impl CombinedReport {
    pub fn new(ranked: &[&ProspectProfile], skipped: &[SkippedCompany], analysis_date: DateTime<Local>) -> Self {
        Self {
            analysis_date,
            companies_analyzed: ranked.len() + skipped.len(),
            data_sources: DATA_SOURCES.iter().map(|s| s.to_string()).collect(),
            low_confidence: ranked
                .iter()
                .filter(|p| p.capacity.low_confidence)
                .map(|p| p.ticker.clone())
                .collect(),
            skipped: skipped.to_vec(),
            results: ranked.iter().map(|p| ProfileRecord::from(*p)).collect(),
        }
    }
}

pub fn profile_file_name(ticker: &str) -> String {
    format!("{ticker}_prospect_profile.json")
}

/// Write one profile JSON file.
pub fn write_profile_json(path: &Path, profile: &ProspectProfile) -> Result<(), AppError> {
    write_json(path, &ProfileRecord::from(profile))
}

/// Write every profile into `dir` (created if needed). Returns the paths written.
pub fn write_profiles(dir: &Path, profiles: &[&ProspectProfile]) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::output(format!("Failed to create output dir '{}': {e}", dir.display())))?;
    let mut written = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let path = dir.join(profile_file_name(&profile.ticker));
        write_profile_json(&path, profile)?;
        tracing::debug!(path = %path.display(), "wrote profile");
        written.push(path);
    }
    Ok(written)
}

pub fn write_combined_json(path: &Path, report: &CombinedReport) -> Result<(), AppError> {
    write_json(path, report)
}

/// Read a profile JSON file.
///
/// The rating and alignment labels must be ones this tool writes.
pub fn read_profile_json(path: &Path) -> Result<ProfileRecord, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::output(format!("Failed to open profile JSON '{}': {e}", path.display())))?;
    let record: ProfileRecord =
        serde_json::from_reader(file).map_err(|e| AppError::output(format!("Invalid profile JSON: {e}")))?;

    if CapacityRating::from_label(&record.capacity.rating).is_none() {
        return Err(AppError::output(format!(
            "Invalid profile JSON: unknown capacity rating '{}'.",
            record.capacity.rating
        )));
    }
    if AlignmentLevel::from_label(&record.alignment.level).is_none() {
        return Err(AppError::output(format!(
            "Invalid profile JSON: unknown alignment level '{}'.",
            record.alignment.level
        )));
    }
    Ok(record)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::output(format!("Failed to write '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use crate::config::{AlignmentConfig, CapacityConfig};
    use crate::domain::{CompanyIdentity, Fact, FinancialSnapshot};
    use crate::profile::{ProfileParts, assemble_profile};
    use crate::scoring::{assess_alignment, score_capacity};

    fn fact(value: f64) -> FactValue {
        FactValue::Present(Fact {
            value,
            period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            tag: "us-gaap.Test".to_string(),
            form: Some("10-K".to_string()),
            fiscal_year: Some(2024),
        })
    }

    fn unh(cash: FactValue) -> ProspectProfile {
        let identity = CompanyIdentity {
            ticker: "UNH".to_string(),
            name: "UNITEDHEALTH GROUP INC".to_string(),
            cik: Some("0000731766".to_string()),
            sic: Some("6324".to_string()),
            sic_description: Some("Hospital & Medical Service Plans".to_string()),
            city: Some("Minnetonka".to_string()),
            state: Some("DE".to_string()),
            fiscal_year_end: Some("1231".to_string()),
            description: None,
        };
        let snapshot = FinancialSnapshot::unavailable()
            .with(Metric::Revenue, fact(400_278_000_000.0))
            .with(Metric::NetIncome, fact(14_405_000_000.0))
            .with(Metric::TotalAssets, fact(298_278_000_000.0))
            .with(Metric::CashAndEquivalents, cash);
        let parts = ProfileParts {
            capacity: score_capacity(&snapshot, &CapacityConfig::default()),
            alignment: assess_alignment(&identity, &AlignmentConfig::default()),
            identity,
            snapshot,
            foundation: None,
            issues: Vec::new(),
        };
        assemble_profile(parts, Local.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn schema_matches_crm_layout() {
        let value: Value = serde_json::to_value(ProfileRecord::from(&unh(FactValue::Unavailable))).unwrap();
        assert_eq!(value["ticker"], json!("UNH"));
        assert_eq!(
            value["company"],
            json!({"name": "UNITEDHEALTH GROUP INC", "sic_description": "Hospital & Medical Service Plans", "state": "DE"})
        );
        assert_eq!(value["financials"]["cash_and_equivalents"], Value::Null);
        assert_eq!(
            value["financials"]["revenue"],
            json!({"value": 400_278_000_000.0, "period_end": "2024-12-31"})
        );
        assert_eq!(value["capacity"]["rating"], json!("PRINCIPAL ($50K-$250K)"));
        assert_eq!(value["alignment"]["level"], json!("HIGH"));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn cash_value_round_trips_exactly() {
        let cash = 25_312_000_000.0;
        let dir = tempfile::tempdir().unwrap();
        let profile = unh(fact(cash));
        let written = write_profiles(dir.path(), &[&profile]).unwrap();
        assert_eq!(written[0].file_name().unwrap(), "UNH_prospect_profile.json");

        let record = read_profile_json(&written[0]).unwrap();
        assert_eq!(record.financials.get(Metric::CashAndEquivalents).unwrap().value, cash);
        assert_eq!(record.capacity.rating, "MAJOR ($1M+)");
        assert_eq!(record, ProfileRecord::from(&profile));
    }

    #[test]
    fn unknown_rating_label_is_rejected_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let profile = unh(fact(25_312_000_000.0));
        let path = dir.path().join(profile_file_name(&profile.ticker));
        write_profile_json(&path, &profile).unwrap();

        let mut raw: Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        raw["capacity"]["rating"] = json!("PLATINUM");
        std::fs::write(&path, raw.to_string()).unwrap();

        let err = read_profile_json(&path).unwrap_err();
        assert!(err.message().contains("PLATINUM"));
    }

    #[test]
    fn combined_report_lists_low_confidence_and_skips() {
        let degraded = unh(FactValue::Unavailable);
        let skipped = vec![SkippedCompany {
            company: "Mystery Co".to_string(),
            reason: "no ticker".to_string(),
        }];
        let report = CombinedReport::new(&[&degraded], &skipped, degraded.researched_at);
        assert_eq!(report.companies_analyzed, 2);
        assert_eq!(report.low_confidence, vec!["UNH".to_string()]);
        assert_eq!(report.data_sources.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(COMBINED_FILE_NAME);
        write_combined_json(&path, &report).unwrap();
        let parsed: Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(parsed["results"][0]["ticker"], json!("UNH"));
        assert_eq!(parsed["skipped"][0]["company"], json!("Mystery Co"));
    }
}
