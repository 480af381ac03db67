//! # Wikipedia Client
//!
//! REST page summary plus the raw wikitext of the lead section (where the
//! infobox lives).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{EncyclopediaApi, JsonObject};
use crate::config::WikipediaConfig;
use crate::error::AcquisitionError;

pub struct WikipediaClient {
    client: reqwest::Client,
    config: WikipediaConfig,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("devduel/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, AcquisitionError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                service: "Wikipedia",
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| AcquisitionError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl EncyclopediaApi for WikipediaClient {
    async fn fetch_summary(&self, title: &str) -> Result<JsonObject, AcquisitionError> {
        let url = format!(
            "{}/page/summary/{}",
            self.config.rest_url.trim_end_matches('/'),
            urlencoding::encode(&title.replace(' ', "_"))
        );
        let body = self.get_json(&url, &[]).await?;
        Ok(map_summary(&body))
    }

    async fn fetch_wikitext(&self, title: &str) -> Result<String, AcquisitionError> {
        let body = self
            .get_json(
                &self.config.action_url,
                &[
                    ("action", "parse"),
                    ("page", title),
                    ("prop", "wikitext"),
                    ("section", "0"),
                    ("format", "json"),
                ],
            )
            .await?;

        body.pointer("/parse/wikitext/*")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AcquisitionError::Malformed("no wikitext in parse response".into()))
    }

    async fn health(&self) -> bool {
        let url = format!("{}/page/summary/Main_Page", self.config.rest_url.trim_end_matches('/'));
        self.client
            .get(url)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

/// Flatten the REST summary into the fields the normalizer reads
fn map_summary(body: &Value) -> JsonObject {
    let mut out = JsonObject::new();
    let mut put = |key: &str, value: Option<&Value>| {
        if let Some(s) = value.and_then(Value::as_str).filter(|s| !s.is_empty()) {
            out.insert(key.to_string(), Value::String(s.to_string()));
        }
    };

    put("title", body.get("title"));
    put("name", body.get("title"));
    put("description", body.get("description"));
    put("intro", body.get("extract"));
    put(
        "image",
        body.pointer("/originalimage/source")
            .or_else(|| body.pointer("/thumbnail/source")),
    );
    put("thumbnail", body.pointer("/thumbnail/source"));
    put("url", body.pointer("/content_urls/desktop/page"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WikipediaClient {
        WikipediaClient::new(WikipediaConfig {
            rest_url: server.uri(),
            action_url: format!("{}/w/api.php", server.uri()),
            ..WikipediaConfig::default()
        })
    }

    #[tokio::test]
    async fn test_fetch_summary_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page/summary/Grace_Hopper"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Grace Hopper",
                "description": "American computer scientist",
                "extract": "Grace Brewster Hopper was an American computer scientist.",
                "thumbnail": { "source": "https://img.example/thumb.jpg" },
                "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Grace_Hopper" } }
            })))
            .mount(&server)
            .await;

        let summary = client(&server).fetch_summary("Grace Hopper").await.unwrap();
        assert_eq!(summary["name"], "Grace Hopper");
        assert_eq!(summary["intro"], "Grace Brewster Hopper was an American computer scientist.");
        assert_eq!(summary["image"], "https://img.example/thumb.jpg");
        assert!(summary.contains_key("url"));
    }

    #[tokio::test]
    async fn test_fetch_wikitext_reads_star_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "parse"))
            .and(query_param("page", "Grace Hopper"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parse": { "wikitext": { "*": "{{Infobox scientist\n| name = Grace Hopper\n}}" } }
            })))
            .mount(&server)
            .await;

        let text = client(&server).fetch_wikitext("Grace Hopper").await.unwrap();
        assert!(text.starts_with("{{Infobox scientist"));
    }

    #[tokio::test]
    async fn test_fetch_wikitext_missing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "code": "missingtitle" }
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_wikitext("Nope").await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Malformed(_)));
    }
}
