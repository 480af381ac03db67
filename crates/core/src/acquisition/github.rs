//! # GitHub REST Client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

use super::{CodeHostApi, JsonObject};
use crate::config::GitHubConfig;
use crate::error::AcquisitionError;

const SERVICE: &str = "GitHub API";

pub struct GitHubClient {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("devduel/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, AcquisitionError> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = self.config.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                service: SERVICE,
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
impl CodeHostApi for GitHubClient {
    async fn fetch_user(&self, login: &str) -> Result<JsonObject, AcquisitionError> {
        let url = self.endpoint(&format!("/users/{}", urlencoding::encode(login)));
        match self.get_json(&url, &[]).await? {
            Value::Object(user) => Ok(user),
            other => Err(AcquisitionError::Malformed(format!("user is not an object: {}", other))),
        }
    }

    async fn fetch_repositories(&self, login: &str) -> Result<Vec<Value>, AcquisitionError> {
        let url = self.endpoint(&format!("/users/{}/repos", urlencoding::encode(login)));
        match self
            .get_json(&url, &[("sort", "updated"), ("per_page", "20")])
            .await?
        {
            Value::Array(repos) => Ok(repos),
            other => Err(AcquisitionError::Malformed(format!("repos is not an array: {}", other))),
        }
    }

    async fn health(&self) -> bool {
        match self.client.get(self.endpoint("/rate_limit")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "GitHub health probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> GitHubClient {
        GitHubClient::new(GitHubConfig {
            api_url: server.uri(),
            token: token.map(str::to_string),
            ..GitHubConfig::default()
        })
    }

    #[tokio::test]
    async fn test_fetch_user_sends_accept_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .and(header("accept", "application/vnd.github.v3+json"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "octocat", "name": "The Octocat", "followers": 9000
            })))
            .mount(&server)
            .await;

        let user = client(&server, Some("ghp_test")).fetch_user("octocat").await.unwrap();
        assert_eq!(user["name"], "The Octocat");
    }

    #[tokio::test]
    async fn test_fetch_repositories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("per_page", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "hello-world", "stargazers_count": 80 },
                { "name": "spoon-knife", "stargazers_count": 12 }
            ])))
            .mount(&server)
            .await;

        let repos = client(&server, None).fetch_repositories("octocat").await.unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0]["name"], "hello-world");
    }

    #[tokio::test]
    async fn test_missing_user_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server, None).fetch_user("nobody").await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Status { status: 404, .. }));
    }
}
