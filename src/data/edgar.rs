//! SEC EDGAR integration: ticker → CIK lookup, submissions metadata, XBRL company facts.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::SourceConfig;
use crate::error::AppError;
use crate::normalize::pad_cik;
use crate::normalize::resolver::as_text;

pub struct EdgarClient {
    client: Client,
    ticker_map_url: String,
    base_url: String,
    delay: Duration,
    /// Upper-case ticker → 10-digit CIK, fetched on first use.
    tickers: OnceCell<HashMap<String, String>>,
}

impl EdgarClient {
    pub fn new(config: &SourceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build SEC HTTP client: {e}")))?;
        Ok(Self {
            client,
            ticker_map_url: config.ticker_map_url.clone(),
            base_url: config.sec_base_url.trim_end_matches('/').to_string(),
            delay: Duration::from_millis(config.request_delay_ms),
            tickers: OnceCell::new(),
        })
    }

    /// Resolve a ticker to its zero-padded CIK.
    pub fn cik_for(&self, ticker: &str) -> Result<String, AppError> {
        let map = match self.tickers.get() {
            Some(map) => map,
            None => {
                let body = self.get_json(&self.ticker_map_url)?;
                let map = parse_ticker_map(&body);
                tracing::debug!(entries = map.len(), "loaded SEC ticker map");
                self.tickers.get_or_init(|| map)
            }
        };
        map.get(&ticker.trim().to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| AppError::unavailable(format!("No SEC CIK found for ticker {ticker}.")))
    }

    /// Submissions payload (name, SIC, state of incorporation, ...).
    pub fn submissions(&self, ticker: &str) -> Result<Value, AppError> {
        let cik = self.cik_for(ticker)?;
        let mut body = self.get_json(&format!("{}/submissions/CIK{cik}.json", self.base_url))?;
        if let Value::Object(map) = &mut body {
            map.entry("cik").or_insert(Value::String(cik));
        }
        Ok(body)
    }

    /// XBRL company facts payload.
    pub fn company_facts(&self, ticker: &str) -> Result<Value, AppError> {
        let cik = self.cik_for(ticker)?;
        self.get_json(&format!("{}/api/xbrl/companyfacts/CIK{cik}.json", self.base_url))
    }

    fn get_json(&self, url: &str) -> Result<Value, AppError> {
        // SEC fair-access policy: keep well under 10 requests per second.
        std::thread::sleep(self.delay);
        tracing::debug!(url, "GET");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::unavailable(format!("SEC request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::unavailable(format!(
                "SEC request {url} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::unavailable(format!("Failed to parse SEC response: {e}")))
    }
}

/// Parse `company_tickers.json` (`{"0": {"cik_str": 320193, "ticker": "AAPL", ...}, ...}`).
///
/// Malformed entries are skipped. The first entry for a ticker wins.
pub fn parse_ticker_map(body: &Value) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Some(entries) = body.as_object() else {
        return map;
    };
    for entry in entries.values() {
        let ticker = entry.get("ticker").and_then(as_text);
        let cik = entry.get("cik_str").and_then(as_text);
        if let (Some(ticker), Some(cik)) = (ticker, cik) {
            map.entry(ticker.to_ascii_uppercase()).or_insert_with(|| pad_cik(&cik));
        }
    }
    map
}
