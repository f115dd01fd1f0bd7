//! Shared domain types.
//!
//! Everything downstream of the normalizer works on these explicit records, never
//! on the raw JSON returned by the filing sources. Optional facts are modeled as
//! tagged variants so a missing value can never be mistaken for zero.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Who a prospect is. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyIdentity {
    /// Unique key for the run (always upper-case).
    pub ticker: String,
    pub name: String,
    /// SEC Central Index Key, zero padded to 10 digits.
    pub cik: Option<String>,
    pub sic: Option<String>,
    pub sic_description: Option<String>,
    pub city: Option<String>,
    /// State of incorporation as reported by the registry.
    pub state: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub description: Option<String>,
}

impl CompanyIdentity {
    /// Industry label, or an empty string when the registry had none.
    pub fn sector_label(&self) -> &str {
        self.sic_description.as_deref().unwrap_or("")
    }

    /// Human-readable location (`City, ST`), skipping whatever is unknown.
    pub fn location(&self) -> String {
        match (self.city.as_deref(), self.state.as_deref()) {
            (Some(city), Some(state)) => format!("{city}, {state}"),
            (Some(city), None) => city.to_string(),
            (None, Some(state)) => state.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Financial concepts carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Revenue,
    NetIncome,
    TotalAssets,
    CashAndEquivalents,
    StockholdersEquity,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Revenue,
        Metric::NetIncome,
        Metric::TotalAssets,
        Metric::CashAndEquivalents,
        Metric::StockholdersEquity,
    ];

    /// Key used in the persisted `financials` object.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::NetIncome => "net_income",
            Metric::TotalAssets => "total_assets",
            Metric::CashAndEquivalents => "cash_and_equivalents",
            Metric::StockholdersEquity => "stockholders_equity",
        }
    }

    /// Label used in terminal reports.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::NetIncome => "Net income",
            Metric::TotalAssets => "Total assets",
            Metric::CashAndEquivalents => "Cash position",
            Metric::StockholdersEquity => "Stockholders' equity",
        }
    }
}

/// One reported value, tagged with the period it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    /// Whole currency units (USD), never scaled.
    pub value: f64,
    pub period_end: NaiveDate,
    /// Taxonomy tag the value was resolved from (e.g. `us-gaap.Revenues`).
    pub tag: String,
    pub form: Option<String>,
    pub fiscal_year: Option<i32>,
}

/// A fact that is either present or explicitly unavailable.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FactValue {
    Present(Fact),
    #[default]
    Unavailable,
}

impl FactValue {
    pub fn fact(&self) -> Option<&Fact> {
        match self {
            FactValue::Present(fact) => Some(fact),
            FactValue::Unavailable => None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.fact().map(|f| f.value)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FactValue::Present(_))
    }
}

/// Normalized company financials.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinancialSnapshot {
    pub revenue: FactValue,
    pub net_income: FactValue,
    pub total_assets: FactValue,
    pub cash_and_equivalents: FactValue,
    pub stockholders_equity: FactValue,
}

impl FinancialSnapshot {
    /// A snapshot where every fact is unavailable (used when the source is down).
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: Metric) -> &FactValue {
        match metric {
            Metric::Revenue => &self.revenue,
            Metric::NetIncome => &self.net_income,
            Metric::TotalAssets => &self.total_assets,
            Metric::CashAndEquivalents => &self.cash_and_equivalents,
            Metric::StockholdersEquity => &self.stockholders_equity,
        }
    }

    pub fn with(mut self, metric: Metric, value: FactValue) -> Self {
        let slot = match metric {
            Metric::Revenue => &mut self.revenue,
            Metric::NetIncome => &mut self.net_income,
            Metric::TotalAssets => &mut self.total_assets,
            Metric::CashAndEquivalents => &mut self.cash_and_equivalents,
            Metric::StockholdersEquity => &mut self.stockholders_equity,
        };
        *slot = value;
        self
    }

    pub fn present_count(&self) -> usize {
        Metric::ALL.iter().filter(|m| self.get(**m).is_present()).count()
    }
}

/// One year of a foundation's 990 filings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FoundationFiling {
    pub year: Option<i32>,
    pub revenue: Option<f64>,
    pub expenses: Option<f64>,
    pub assets: Option<f64>,
    pub grants_paid: Option<f64>,
}

/// Affiliated private foundation, when one was found.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundationRecord {
    pub name: String,
    pub ein: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub assets: Option<f64>,
    pub revenue: Option<f64>,
    /// Grants paid in the most recent filing.
    pub grants_paid: Option<f64>,
    pub ruling_date: Option<NaiveDate>,
    /// Most recent filings first.
    pub recent_filings: Vec<FoundationFiling>,
}

/// Giving-capacity tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapacityRating {
    Standard,
    Principal,
    Leadership,
    Major,
}

impl CapacityRating {
    pub fn label(self) -> &'static str {
        match self {
            CapacityRating::Standard => "STANDARD ($10K-$50K)",
            CapacityRating::Principal => "PRINCIPAL ($50K-$250K)",
            CapacityRating::Leadership => "LEADERSHIP ($250K-$1M)",
            CapacityRating::Major => "MAJOR ($1M+)",
        }
    }

    /// Parse a persisted label back into a tier.
    pub fn from_label(label: &str) -> Option<Self> {
        let head = label.split_whitespace().next()?.to_ascii_uppercase();
        match head.as_str() {
            "STANDARD" => Some(CapacityRating::Standard),
            "PRINCIPAL" => Some(CapacityRating::Principal),
            "LEADERSHIP" => Some(CapacityRating::Leadership),
            "MAJOR" => Some(CapacityRating::Major),
            _ => None,
        }
    }
}

/// The values the capacity formula actually saw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapacityInputs {
    pub cash: Option<f64>,
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapacityScore {
    /// Non-negative; billions of USD with the default reference denominators.
    pub score: f64,
    pub rating: CapacityRating,
    pub inputs: CapacityInputs,
    /// Set when cash or net income was unavailable.
    pub low_confidence: bool,
    pub rationale: Vec<String>,
}

/// Mission-alignment levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlignmentLevel {
    None,
    Low,
    Medium,
    High,
}

impl AlignmentLevel {
    pub fn label(self) -> &'static str {
        match self {
            AlignmentLevel::None => "NONE",
            AlignmentLevel::Low => "LOW",
            AlignmentLevel::Medium => "MEDIUM",
            AlignmentLevel::High => "HIGH",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "NONE" => Some(AlignmentLevel::None),
            "LOW" => Some(AlignmentLevel::Low),
            "MEDIUM" => Some(AlignmentLevel::Medium),
            "HIGH" => Some(AlignmentLevel::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentAssessment {
    pub level: AlignmentLevel,
    pub score: f64,
    /// Explanations in cause-profile rule order.
    pub factors: Vec<String>,
}

/// The assembled prospect. Built once per company per run and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProspectProfile {
    /// Source company key, stamped by the assembler.
    pub ticker: String,
    pub identity: CompanyIdentity,
    pub snapshot: FinancialSnapshot,
    pub foundation: Option<FoundationRecord>,
    pub capacity: CapacityScore,
    pub alignment: AlignmentAssessment,
    /// Upstream records that could not be retrieved for this company.
    pub issues: Vec<String>,
    pub researched_at: DateTime<Local>,
}

/// A configured company that produced no profile, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCompany {
    pub company: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_and_level_orders_are_ascending() {
        assert!(CapacityRating::Standard < CapacityRating::Principal);
        assert!(CapacityRating::Leadership < CapacityRating::Major);
        assert!(AlignmentLevel::None < AlignmentLevel::Low);
        assert!(AlignmentLevel::Medium < AlignmentLevel::High);
    }

    #[test]
    fn labels_parse_back() {
        assert_eq!(CapacityRating::from_label("MAJOR ($1M+)"), Some(CapacityRating::Major));
        assert_eq!(CapacityRating::from_label("bogus"), None);
        assert_eq!(AlignmentLevel::from_label("medium"), Some(AlignmentLevel::Medium));
    }

    #[test]
    fn snapshot_with_replaces_one_metric() {
        let fact = Fact {
            value: 25_000_000_000.0,
            period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            tag: "us-gaap.CashAndCashEquivalentsAtCarryingValue".to_string(),
            form: Some("10-K".to_string()),
            fiscal_year: Some(2024),
        };
        let snapshot = FinancialSnapshot::unavailable()
            .with(Metric::CashAndEquivalents, FactValue::Present(fact));
        assert_eq!(snapshot.present_count(), 1);
        assert_eq!(snapshot.get(Metric::CashAndEquivalents).value(), Some(25_000_000_000.0));
        assert_eq!(snapshot.get(Metric::NetIncome), &FactValue::Unavailable);
    }

    #[test]
    fn identity_location_skips_unknown_parts() {
        let identity = CompanyIdentity {
            ticker: "TGT".to_string(),
            name: "Target Corporation".to_string(),
            cik: None,
            sic: None,
            sic_description: None,
            city: Some("Minneapolis".to_string()),
            state: None,
            fiscal_year_end: None,
            description: None,
        };
        assert_eq!(identity.location(), "Minneapolis");
        assert_eq!(identity.sector_label(), "");
    }
}
