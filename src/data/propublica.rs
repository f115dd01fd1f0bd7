//! ProPublica Nonprofit Explorer integration (Form 990 data).

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::SourceConfig;
use crate::error::AppError;

pub struct ProPublicaClient {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl ProPublicaClient {
    pub fn new(config: &SourceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build ProPublica HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.propublica_base_url.trim_end_matches('/').to_string(),
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Full-text organization search.
    pub fn search(&self, query: &str) -> Result<Value, AppError> {
        let req = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[("q", query)]);
        self.send(req)
    }

    /// Organization profile plus filings for one EIN.
    pub fn organization(&self, ein: &str) -> Result<Value, AppError> {
        let ein: String = ein.chars().filter(char::is_ascii_digit).collect();
        if ein.is_empty() {
            return Err(AppError::unavailable("Foundation EIN is empty."));
        }
        let req = self.client.get(format!("{}/organizations/{ein}.json", self.base_url));
        self.send(req)
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<Value, AppError> {
        // Same pacing as SEC; search terms are tried back to back.
        std::thread::sleep(self.delay);

        let resp = req
            .send()
            .map_err(|e| AppError::unavailable(format!("ProPublica request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::unavailable(format!(
                "ProPublica request failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::unavailable(format!("Failed to parse ProPublica response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_paced_by_configured_delay() {
        let config = SourceConfig {
            request_delay_ms: 250,
            propublica_base_url: "https://example.org/api/v2/".to_string(),
            ..SourceConfig::default()
        };
        let client = ProPublicaClient::new(&config).unwrap();
        assert_eq!(client.delay, Duration::from_millis(250));
        assert_eq!(client.base_url, "https://example.org/api/v2");
    }

    #[test]
    fn blank_ein_fails_without_a_request() {
        let client = ProPublicaClient::new(&SourceConfig::default()).unwrap();
        let err = client.organization("--").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::SourceUnavailable);
    }
}
