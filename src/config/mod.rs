//! Run configuration.
//!
//! Loaded from a TOML file (`--config`, else `PROSPECT_CONFIG`, else built-in
//! defaults). Every table is optional; omitted keys fall back to the defaults
//! below, which reproduce the Minnesota / pediatric-cancer research setup.
//!
//! The config is validated once, up front. A malformed threshold, weight or tag
//! table is the only fatal error class in a research run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Metric;
use crate::error::AppError;

pub const CONFIG_ENV: &str = "PROSPECT_CONFIG";
pub const USER_AGENT_ENV: &str = "SEC_USER_AGENT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub source: SourceConfig,
    pub companies: Vec<CompanyConfig>,
    pub capacity: CapacityConfig,
    pub alignment: AlignmentConfig,
    pub taxonomy: TaxonomyConfig,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            companies: default_companies(),
            capacity: CapacityConfig::default(),
            alignment: AlignmentConfig::default(),
            taxonomy: TaxonomyConfig::default(),
        }
    }
}

/// Upstream endpoints and request etiquette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// SEC requires a descriptive `User-Agent` with a contact address.
    pub user_agent: String,
    pub ticker_map_url: String,
    pub sec_base_url: String,
    pub propublica_base_url: String,
    /// Pause before each upstream request (SEC and ProPublica).
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: "CCRFProspectResearch/1.0 (research@ccrf.org)".to_string(),
            ticker_map_url: "https://www.sec.gov/files/company_tickers.json".to_string(),
            sec_base_url: "https://data.sec.gov".to_string(),
            propublica_base_url: "https://projects.propublica.org/nonprofits/api/v2".to_string(),
            request_delay_ms: 100,
            timeout_secs: 30,
        }
    }
}

/// One company to research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyConfig {
    /// A missing or blank ticker skips the company at research time.
    #[serde(default)]
    pub ticker: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Headquarters state; used when the registry has no state on file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Extra free text matched against the cause profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CompanyConfig {
    pub fn new(ticker: &str, name: &str, city: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: name.to_string(),
            city: Some(city.to_string()),
            state: Some("MN".to_string()),
            description: None,
        }
    }
}

fn default_companies() -> Vec<CompanyConfig> {
    vec![
        CompanyConfig::new("TGT", "Target Corporation", "Minneapolis"),
        CompanyConfig::new("MMM", "3M Company", "St. Paul"),
        CompanyConfig::new("UNH", "UnitedHealth Group", "Minnetonka"),
    ]
}

/// Capacity formula weights, reference denominators and tier thresholds.
///
/// Thresholds are lower bounds: a score equal to a threshold belongs to the
/// higher tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    pub cash_weight: f64,
    pub net_income_weight: f64,
    pub cash_reference: f64,
    pub net_income_reference: f64,
    /// Upper bound on the score when cash is unavailable.
    pub net_income_only_ceiling: f64,
    pub principal_threshold: f64,
    /// Optional intermediate tier between principal and major.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leadership_threshold: Option<f64>,
    pub major_threshold: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            cash_weight: 1.0,
            net_income_weight: 1.0,
            cash_reference: 1_000_000_000.0,
            net_income_reference: 1_000_000_000.0,
            net_income_only_ceiling: 15.0,
            principal_threshold: 5.0,
            leadership_threshold: None,
            major_threshold: 30.0,
        }
    }
}

/// What part of the identity a rule is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    /// SIC description plus any free-text description.
    Sector,
    /// City and state.
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRule {
    pub name: String,
    #[serde(default = "default_rule_target")]
    pub target: RuleTarget,
    pub keywords: Vec<String>,
    /// Explanation recorded when the rule matches.
    pub factor: String,
    pub weight: f64,
}

fn default_rule_target() -> RuleTarget {
    RuleTarget::Sector
}

impl AlignmentRule {
    fn new(name: &str, target: RuleTarget, keywords: &[&str], factor: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            target,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            factor: factor.to_string(),
            weight,
        }
    }
}

/// The cause profile: keyword rules plus level thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub cause: String,
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub low_threshold: f64,
    pub rules: Vec<AlignmentRule>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            cause: "Pediatric cancer research".to_string(),
            high_threshold: 4.0,
            medium_threshold: 2.0,
            low_threshold: 1.0,
            rules: vec![
                AlignmentRule::new(
                    "healthcare",
                    RuleTarget::Sector,
                    &["health", "medical", "pharmaceutical", "hospital"],
                    "Healthcare sector - STRONG alignment with pediatric health mission",
                    4.0,
                ),
                AlignmentRule::new(
                    "retail",
                    RuleTarget::Sector,
                    &["retail", "store", "merchandise"],
                    "Retail sector - Strong community presence, cause marketing potential",
                    2.0,
                ),
                AlignmentRule::new(
                    "manufacturing",
                    RuleTarget::Sector,
                    &["manufacturing", "chemical", "industrial"],
                    "Manufacturing sector - Likely has established CSR programs",
                    1.0,
                ),
                AlignmentRule::new(
                    "minnesota",
                    RuleTarget::Location,
                    &["minnesota", "minneapolis", "st. paul", "saint paul", "minnetonka"],
                    "Minnesota headquarters - Local community connection to CCRF",
                    1.0,
                ),
            ],
        }
    }
}

/// A reporting unit accepted by the normalizer and its multiplier to whole USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitScale {
    pub name: String,
    pub scale: f64,
}

/// Ordered tag fallback lists per metric (`taxonomy.Concept`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricTags {
    pub revenue: Vec<String>,
    pub net_income: Vec<String>,
    pub total_assets: Vec<String>,
    pub cash_and_equivalents: Vec<String>,
    pub stockholders_equity: Vec<String>,
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

impl Default for MetricTags {
    fn default() -> Self {
        Self {
            revenue: tags(&[
                "us-gaap.Revenues",
                "us-gaap.RevenueFromContractWithCustomerExcludingAssessedTax",
                "us-gaap.SalesRevenueNet",
                "ifrs-full.Revenue",
            ]),
            net_income: tags(&[
                "us-gaap.NetIncomeLoss",
                "us-gaap.ProfitLoss",
                "ifrs-full.ProfitLoss",
            ]),
            total_assets: tags(&["us-gaap.Assets", "ifrs-full.Assets"]),
            cash_and_equivalents: tags(&[
                "us-gaap.CashAndCashEquivalentsAtCarryingValue",
                "us-gaap.CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents",
                "us-gaap.Cash",
                "ifrs-full.CashAndCashEquivalents",
            ]),
            stockholders_equity: tags(&[
                "us-gaap.StockholdersEquity",
                "us-gaap.StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
                "ifrs-full.Equity",
            ]),
        }
    }
}

impl MetricTags {
    pub fn for_metric(&self, metric: Metric) -> &[String] {
        match metric {
            Metric::Revenue => &self.revenue,
            Metric::NetIncome => &self.net_income,
            Metric::TotalAssets => &self.total_assets,
            Metric::CashAndEquivalents => &self.cash_and_equivalents,
            Metric::StockholdersEquity => &self.stockholders_equity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Forms treated as annual reports.
    pub annual_forms: Vec<String>,
    pub units: Vec<UnitScale>,
    pub tags: MetricTags,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            annual_forms: tags(&["10-K", "20-F", "40-F"]),
            units: vec![UnitScale {
                name: "USD".to_string(),
                scale: 1.0,
            }],
            tags: MetricTags::default(),
        }
    }
}

impl ResearchConfig {
    /// Resolve and load the configuration for a run.
    ///
    /// Precedence: explicit path, then `PROSPECT_CONFIG` (a `.env` file is honoured),
    /// then built-in defaults. `SEC_USER_AGENT` overrides the user agent in all cases.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let resolved: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var(CONFIG_ENV).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from),
        };

        let mut config = match &resolved {
            Some(p) => {
                tracing::info!(path = %p.display(), "loading research config");
                let raw = std::fs::read_to_string(p)
                    .map_err(|e| AppError::config(format!("Failed to read config '{}': {e}", p.display())))?;
                Self::from_toml_str(&raw)?
            }
            None => {
                tracing::info!("no config file given; using built-in defaults");
                Self::default()
            }
        };

        if let Ok(agent) = std::env::var(USER_AGENT_ENV)
            && !agent.trim().is_empty()
        {
            config.source.user_agent = agent;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        toml::from_str(raw).map_err(|e| AppError::config(format!("Invalid config TOML: {e}")))
    }

    pub fn to_toml_string(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::config(format!("Failed to render config: {e}")))
    }

    /// Keep only the companies whose ticker is in `tickers` (case-insensitive).
    pub fn restrict_to(mut self, tickers: &[String]) -> Result<Self, AppError> {
        if tickers.is_empty() {
            return Ok(self);
        }
        let wanted: HashSet<String> = tickers.iter().map(|t| t.trim().to_ascii_uppercase()).collect();
        self.companies
            .retain(|c| wanted.contains(&c.ticker.trim().to_ascii_uppercase()));
        if self.companies.is_empty() {
            return Err(AppError::config(format!(
                "None of the requested tickers ({}) are configured.",
                tickers.join(", ")
            )));
        }
        Ok(self)
    }

    /// Check every invariant the scoring code relies on.
    pub fn validate(&self) -> Result<(), AppError> {
        self.source.validate()?;
        validate_companies(&self.companies)?;
        self.capacity.validate()?;
        self.alignment.validate()?;
        self.taxonomy.validate()?;
        Ok(())
    }
}

impl SourceConfig {
    fn validate(&self) -> Result<(), AppError> {
        if self.user_agent.trim().is_empty() {
            return Err(AppError::config("source.user_agent must not be empty (SEC rejects anonymous clients)."));
        }
        for (key, url) in [
            ("ticker_map_url", &self.ticker_map_url),
            ("sec_base_url", &self.sec_base_url),
            ("propublica_base_url", &self.propublica_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::config(format!("source.{key} must be an http(s) URL, got '{url}'.")));
            }
        }
        if self.timeout_secs == 0 {
            return Err(AppError::config("source.timeout_secs must be > 0."));
        }
        Ok(())
    }
}

fn validate_companies(companies: &[CompanyConfig]) -> Result<(), AppError> {
    if companies.is_empty() {
        return Err(AppError::config("No companies configured."));
    }
    // Blank tickers are reported per company by the assembler; duplicates would
    // make the ticker key ambiguous.
    let mut seen = HashSet::new();
    for company in companies {
        let key = company.ticker.trim().to_ascii_uppercase();
        if !key.is_empty() && !seen.insert(key.clone()) {
            return Err(AppError::config(format!("Duplicate company ticker '{key}'.")));
        }
    }
    Ok(())
}

fn ensure_finite(key: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AppError::config(format!("{key} must be a finite number.")))
    }
}

impl CapacityConfig {
    fn validate(&self) -> Result<(), AppError> {
        for (key, weight) in [
            ("capacity.cash_weight", self.cash_weight),
            ("capacity.net_income_weight", self.net_income_weight),
            ("capacity.net_income_only_ceiling", self.net_income_only_ceiling),
        ] {
            ensure_finite(key, weight)?;
            if weight < 0.0 {
                return Err(AppError::config(format!("{key} must be >= 0.")));
            }
        }
        for (key, reference) in [
            ("capacity.cash_reference", self.cash_reference),
            ("capacity.net_income_reference", self.net_income_reference),
        ] {
            ensure_finite(key, reference)?;
            if reference <= 0.0 {
                return Err(AppError::config(format!("{key} must be > 0.")));
            }
        }

        ensure_finite("capacity.principal_threshold", self.principal_threshold)?;
        ensure_finite("capacity.major_threshold", self.major_threshold)?;
        if self.principal_threshold <= 0.0 {
            return Err(AppError::config("capacity.principal_threshold must be > 0."));
        }
        if self.major_threshold <= self.principal_threshold {
            return Err(AppError::config(
                "capacity thresholds must ascend: principal_threshold < major_threshold.",
            ));
        }
        if let Some(leadership) = self.leadership_threshold {
            ensure_finite("capacity.leadership_threshold", leadership)?;
            if !(self.principal_threshold < leadership && leadership < self.major_threshold) {
                return Err(AppError::config(
                    "capacity.leadership_threshold must lie strictly between principal and major thresholds.",
                ));
            }
        }
        Ok(())
    }
}

impl AlignmentConfig {
    fn validate(&self) -> Result<(), AppError> {
        ensure_finite("alignment.low_threshold", self.low_threshold)?;
        ensure_finite("alignment.medium_threshold", self.medium_threshold)?;
        ensure_finite("alignment.high_threshold", self.high_threshold)?;
        if !(0.0 < self.low_threshold
            && self.low_threshold < self.medium_threshold
            && self.medium_threshold < self.high_threshold)
        {
            return Err(AppError::config(
                "alignment thresholds must ascend: 0 < low_threshold < medium_threshold < high_threshold.",
            ));
        }
        for rule in &self.rules {
            ensure_finite(&format!("alignment rule '{}' weight", rule.name), rule.weight)?;
            if rule.weight <= 0.0 {
                return Err(AppError::config(format!("alignment rule '{}' weight must be > 0.", rule.name)));
            }
            if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(AppError::config(format!(
                    "alignment rule '{}' needs at least one non-blank keyword.",
                    rule.name
                )));
            }
            if rule.factor.trim().is_empty() {
                return Err(AppError::config(format!("alignment rule '{}' has an empty factor.", rule.name)));
            }
        }
        Ok(())
    }
}

impl TaxonomyConfig {
    fn validate(&self) -> Result<(), AppError> {
        if self.annual_forms.is_empty() {
            return Err(AppError::config("taxonomy.annual_forms must not be empty."));
        }
        if self.units.is_empty() {
            return Err(AppError::config("taxonomy.units must not be empty."));
        }
        for unit in &self.units {
            ensure_finite(&format!("taxonomy unit '{}' scale", unit.name), unit.scale)?;
            if unit.scale <= 0.0 || unit.name.trim().is_empty() {
                return Err(AppError::config(format!("Invalid taxonomy unit '{}'.", unit.name)));
            }
        }
        for metric in Metric::ALL {
            let list = self.tags.for_metric(metric);
            if list.is_empty() {
                return Err(AppError::config(format!("taxonomy.tags.{} must not be empty.", metric.key())));
            }
            for tag in list {
                let mut parts = tag.split('.');
                let well_formed = matches!(
                    (parts.next(), parts.next(), parts.next()),
                    (Some(ns), Some(concept), None) if !ns.is_empty() && !concept.is_empty()
                );
                if !well_formed {
                    return Err(AppError::config(format!(
                        "taxonomy.tags.{}: '{tag}' must look like 'taxonomy.Concept'.",
                        metric.key()
                    )));
                }
            }
        }
        Ok(())
    }
}
