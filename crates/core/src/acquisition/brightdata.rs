//! # Bright Data Web Capture
//!
//! Synchronous dataset scrape: one POST per URL, the response is the list of
//! scraped records.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{JsonObject, Platform, WebCapture};
use crate::config::BrightDataConfig;
use crate::error::AcquisitionError;

/// Identity fields, at least one of which a usable networking record carries
const IDENTITY_FIELDS: &[&str] = &["name", "full_name", "first_name", "position", "about"];

pub struct BrightDataClient {
    client: reqwest::Client,
    config: BrightDataConfig,
}

impl BrightDataClient {
    pub fn new(config: BrightDataConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn dataset_for(&self, platform: Platform) -> &str {
        match platform {
            Platform::LinkedIn => &self.config.linkedin_dataset,
            _ => &self.config.generic_dataset,
        }
    }
}

#[async_trait]
impl WebCapture for BrightDataClient {
    async fn capture(&self, url: &str, platform: Platform) -> Result<JsonObject, AcquisitionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(AcquisitionError::NotConfigured("BRIGHTDATA_API_KEY"))?;

        let endpoint = format!("{}/scrape", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(url, dataset = self.dataset_for(platform), "Bright Data scrape");

        let response = self
            .client
            .post(&endpoint)
            .query(&[("dataset_id", self.dataset_for(platform)), ("format", "json")])
            .bearer_auth(api_key)
            .json(&json!([{ "url": url }]))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                service: "Bright Data",
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AcquisitionError::Malformed(e.to_string()))?;

        let record = match body {
            Value::Array(items) => items.into_iter().next(),
            other => Some(other),
        };

        match record {
            Some(Value::Object(obj)) if has_identity(&obj) => Ok(obj),
            Some(Value::Object(_)) | None => Err(AcquisitionError::EmptyPayload("Bright Data")),
            Some(other) => Err(AcquisitionError::Malformed(format!(
                "expected an object record, got {}",
                other
            ))),
        }
    }

    async fn health(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

fn has_identity(obj: &JsonObject) -> bool {
    IDENTITY_FIELDS.iter().any(|field| match obj.get(*field) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, key: Option<&str>) -> BrightDataConfig {
        BrightDataConfig {
            api_key: key.map(str::to_string),
            base_url: server.uri(),
            ..BrightDataConfig::default()
        }
    }

    #[tokio::test]
    async fn test_capture_returns_first_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scrape"))
            .and(query_param("dataset_id", "gd_l1viktl72bvl7bjuj0"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!([{ "url": "https://linkedin.com/in/ada" }])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "Ada Lovelace", "position": "Analyst" }
            ])))
            .mount(&server)
            .await;

        let client = BrightDataClient::new(config(&server, Some("secret")));
        let record = client
            .capture("https://linkedin.com/in/ada", Platform::LinkedIn)
            .await
            .unwrap();
        assert_eq!(record["name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_capture_without_key_fails_fast() {
        let server = MockServer::start().await;
        let client = BrightDataClient::new(config(&server, None));
        let err = client
            .capture("https://linkedin.com/in/ada", Platform::LinkedIn)
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::NotConfigured(_)));
        assert!(!client.health().await);
    }

    #[tokio::test]
    async fn test_capture_empty_results_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = BrightDataClient::new(config(&server, Some("secret")));
        let err = client
            .capture("https://example.com/me", Platform::Generic)
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::EmptyPayload(_)));
    }

    #[tokio::test]
    async fn test_capture_record_without_identity_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "name": "", "url": "x" }])),
            )
            .mount(&server)
            .await;

        let client = BrightDataClient::new(config(&server, Some("secret")));
        let err = client
            .capture("https://linkedin.com/in/ghost", Platform::LinkedIn)
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::EmptyPayload(_)));
    }

    #[tokio::test]
    async fn test_capture_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = BrightDataClient::new(config(&server, Some("secret")));
        let err = client
            .capture("https://linkedin.com/in/ada", Platform::LinkedIn)
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Status { status: 429, .. }));
    }
}
