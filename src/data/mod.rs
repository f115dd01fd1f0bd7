//! Upstream filing sources.
//!
//! The pipeline only sees the `FilingSource` trait: four calls that each return a
//! complete raw JSON record or an `AppError` of kind `SourceUnavailable`. The live
//! implementation talks to SEC EDGAR and ProPublica; tests plug in fixtures.

pub mod edgar;
pub mod propublica;

use serde_json::Value;

pub use edgar::EdgarClient;
pub use propublica::ProPublicaClient;

use crate::config::SourceConfig;
use crate::error::AppError;

pub trait FilingSource {
    /// Registry metadata for a ticker (SEC submissions).
    fn company_metadata(&self, ticker: &str) -> Result<Value, AppError>;
    /// Taxonomy-tagged financial facts for a ticker (SEC XBRL company facts).
    fn company_facts(&self, ticker: &str) -> Result<Value, AppError>;
    /// Philanthropic organization search.
    fn search_foundations(&self, query: &str) -> Result<Value, AppError>;
    /// Form 990 detail for one organization.
    fn foundation_filing(&self, ein: &str) -> Result<Value, AppError>;
}

/// SEC EDGAR + ProPublica over HTTP.
pub struct LiveSource {
    edgar: EdgarClient,
    propublica: ProPublicaClient,
}

impl LiveSource {
    pub fn from_config(config: &SourceConfig) -> Result<Self, AppError> {
        Ok(Self {
            edgar: EdgarClient::new(config)?,
            propublica: ProPublicaClient::new(config)?,
        })
    }
}

impl FilingSource for LiveSource {
    fn company_metadata(&self, ticker: &str) -> Result<Value, AppError> {
        self.edgar.submissions(ticker)
    }

    fn company_facts(&self, ticker: &str) -> Result<Value, AppError> {
        self.edgar.company_facts(ticker)
    }

    fn search_foundations(&self, query: &str) -> Result<Value, AppError> {
        self.propublica.search(query)
    }

    fn foundation_filing(&self, ein: &str) -> Result<Value, AppError> {
        self.propublica.organization(ein)
    }
}
