//! # Acquisition
//!
//! Turns a profile URL into a [`RawAcquisition`]. The [`AcquisitionResolver`]
//! picks the platform-specific procedure and falls back to the synthetic
//! catalog whenever the real procedure fails.
//!
//! ## Collaborators
//!
//! - [`WebCapture`] - dataset scraping API (Bright Data)
//! - [`CodeHostApi`] - GitHub REST
//! - [`EncyclopediaApi`] - Wikipedia REST summary + wikitext
//! - [`DomCapture`] - plain page fetch with CSS selector extraction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AcquisitionError;

pub mod brightdata;
pub mod dom;
pub mod github;
pub mod resolver;
pub mod synthetic;
pub mod wikipedia;
pub mod wikitext;

pub use brightdata::BrightDataClient;
pub use dom::{HtmlDomCapture, SelectorSpec};
pub use github::GitHubClient;
pub use resolver::{collaborator, resolve, AcquisitionResolver};
pub use synthetic::SyntheticCatalog;
pub use wikipedia::WikipediaClient;

/// Free-form JSON object produced by a collaborator
pub type JsonObject = Map<String, Value>;

/// Source platform, derived purely from URL shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Professional networking profile
    #[serde(rename = "linkedin")]
    LinkedIn,
    /// Source-code host
    #[serde(rename = "github")]
    GitHub,
    /// Encyclopedia article
    Wikipedia,
    #[default]
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::GitHub => "github",
            Platform::Wikipedia => "wikipedia",
            Platform::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unprocessed output of one acquisition, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAcquisition {
    pub platform: Platform,
    pub url: String,
    pub payload: JsonObject,
    pub captured_at: DateTime<Utc>,
    /// Set when the payload is a serialized `CanonicalProfile` from the synthetic catalog
    #[serde(default)]
    pub synthetic: bool,
}

impl RawAcquisition {
    pub fn new(platform: Platform, url: impl Into<String>, payload: JsonObject) -> Self {
        Self {
            platform,
            url: url.into(),
            payload,
            captured_at: Utc::now(),
            synthetic: false,
        }
    }
}

/// Generic web capture through a scraping dataset API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebCapture: Send + Sync {
    /// Capture a page and return the first structured record
    async fn capture(&self, url: &str, platform: Platform) -> Result<JsonObject, AcquisitionError>;

    /// Whether the collaborator has what it needs to run
    async fn health(&self) -> bool;
}

/// Source-code host REST API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeHostApi: Send + Sync {
    /// User metadata (`login`, `name`, `bio`, `followers`, ...)
    async fn fetch_user(&self, login: &str) -> Result<JsonObject, AcquisitionError>;

    /// Public repositories of the user
    async fn fetch_repositories(&self, login: &str) -> Result<Vec<Value>, AcquisitionError>;

    async fn health(&self) -> bool;
}

/// Encyclopedia REST + wikitext API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncyclopediaApi: Send + Sync {
    /// Page summary mapped to `title`, `name`, `description`, `intro`, `image`, `thumbnail`, `url`
    async fn fetch_summary(&self, title: &str) -> Result<JsonObject, AcquisitionError>;

    /// Raw wikitext of the lead section
    async fn fetch_wikitext(&self, title: &str) -> Result<String, AcquisitionError>;

    async fn health(&self) -> bool;
}

/// Page fetch with CSS selector extraction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomCapture: Send + Sync {
    async fn extract(
        &self,
        url: &str,
        selectors: &[SelectorSpec],
    ) -> Result<JsonObject, AcquisitionError>;
}
