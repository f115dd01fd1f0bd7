//! End-to-end run over fixture filings: research, rank, write, read back.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use prospect_research::app::pipeline::run_research_with_source;
use prospect_research::config::{CompanyConfig, ResearchConfig};
use prospect_research::data::FilingSource;
use prospect_research::error::AppError;
use prospect_research::io::{
    COMBINED_FILE_NAME, CombinedReport, read_profile_json, write_combined_json, write_priority_csv, write_profiles,
};

struct Filings;

fn annual(val: f64) -> Value {
    json!({"USD": [
        {"val": val * 0.9, "end": "2023-12-31", "start": "2023-01-01", "filed": "2024-02-20", "form": "10-K"},
        {"val": val, "end": "2024-12-31", "start": "2024-01-01", "filed": "2025-02-27", "form": "10-K"}
    ]})
}

impl FilingSource for Filings {
    fn company_metadata(&self, ticker: &str) -> Result<Value, AppError> {
        match ticker {
            "UNH" => Ok(json!({"name": "UNITEDHEALTH GROUP INC", "cik": 731766,
                               "sicDescription": "Hospital & Medical Service Plans", "stateOfIncorporation": "DE"})),
            "TGT" => Ok(json!({"name": "TARGET CORP", "cik": 27419,
                               "sicDescription": "Retail-Variety Stores", "stateOfIncorporation": "MN"})),
            _ => Err(AppError::unavailable(format!("unknown ticker {ticker}"))),
        }
    }

    fn company_facts(&self, ticker: &str) -> Result<Value, AppError> {
        match ticker {
            "UNH" => Ok(json!({"facts": {"us-gaap": {
                "NetIncomeLoss": {"units": annual(14_405_000_000.0)},
                "CashAndCashEquivalentsAtCarryingValue": {"units": annual(25_312_000_000.0)}
            }}})),
            "TGT" => Ok(json!({"facts": {"us-gaap": {
                "NetIncomeLoss": {"units": annual(4_091_000_000.0)}
            }}})),
            _ => Err(AppError::unavailable("facts endpoint down")),
        }
    }

    fn search_foundations(&self, _query: &str) -> Result<Value, AppError> {
        Ok(json!({"organizations": []}))
    }

    fn foundation_filing(&self, ein: &str) -> Result<Value, AppError> {
        Err(AppError::unavailable(format!("no filing for {ein}")))
    }
}

fn config() -> ResearchConfig {
    ResearchConfig {
        companies: vec![
            CompanyConfig::new("TGT", "Target Corporation", "Minneapolis"),
            CompanyConfig::new("UNH", "UnitedHealth Group", "Minnetonka"),
        ],
        ..ResearchConfig::default()
    }
}

#[test]
fn research_run_writes_ranked_outputs() {
    let run = run_research_with_source(&config(), &Filings);
    assert!(run.skipped.is_empty());

    let ranked = run.ranked();
    let order: Vec<&str> = ranked.iter().map(|p| p.ticker.as_str()).collect();
    assert_eq!(order, vec!["UNH", "TGT"]);
    assert!(ranked[1].capacity.low_confidence);

    let dir = tempfile::tempdir().unwrap();
    let written = write_profiles(dir.path(), &ranked).unwrap();
    assert_eq!(written.len(), 2);

    let unh = read_profile_json(&dir.path().join("UNH_prospect_profile.json")).unwrap();
    assert_eq!(unh.company.name, "UNITEDHEALTH GROUP INC");
    assert_eq!(unh.capacity.rating, "MAJOR ($1M+)");
    assert_eq!(unh.alignment.level, "HIGH");
    let cash = unh.financials.cash_and_equivalents.unwrap();
    assert_eq!(cash.value, 25_312_000_000.0);
    assert_eq!(cash.period_end.to_string(), "2024-12-31");
    assert!(unh.financials.revenue.is_none());

    let combined_path = dir.path().join(COMBINED_FILE_NAME);
    write_combined_json(&combined_path, &CombinedReport::new(&ranked, &run.skipped, run.researched_at)).unwrap();
    let combined: Value = serde_json::from_str(&std::fs::read_to_string(&combined_path).unwrap()).unwrap();
    assert_eq!(combined["companies_analyzed"], json!(2));
    assert_eq!(combined["results"][0]["ticker"], json!("UNH"));
    assert_eq!(combined["low_confidence"], json!(["TGT"]));

    let csv_path = dir.path().join("priority.csv");
    write_priority_csv(&csv_path, &ranked).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 3);
}
