//! # DOM Capture
//!
//! Fetches a page over plain HTTP and pulls fields out with CSS selectors.
//! Parsing happens in a synchronous helper so the `!Send` document never
//! lives across an await point.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::{DomCapture, JsonObject};
use crate::config::DomConfig;
use crate::error::AcquisitionError;

/// How a selector match is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Collapsed text of the first non-empty match
    Text,
    /// Attribute of the first match carrying it
    Attr(&'static str),
    /// Every match is a table row; `th` text becomes the key, `td` text the value
    Rows,
}

/// One field to extract from a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorSpec {
    pub key: &'static str,
    pub css: &'static str,
    pub extract: Extract,
}

impl SelectorSpec {
    pub const fn text(key: &'static str, css: &'static str) -> Self {
        Self { key, css, extract: Extract::Text }
    }

    pub const fn attr(key: &'static str, css: &'static str, attr: &'static str) -> Self {
        Self { key, css, extract: Extract::Attr(attr) }
    }

    pub const fn rows(key: &'static str, css: &'static str) -> Self {
        Self { key, css, extract: Extract::Rows }
    }
}

/// [`DomCapture`] over reqwest + scraper
#[derive(Clone)]
pub struct HtmlDomCapture {
    client: reqwest::Client,
}

impl HtmlDomCapture {
    pub fn new(config: &DomConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl DomCapture for HtmlDomCapture {
    async fn extract(
        &self,
        url: &str,
        selectors: &[SelectorSpec],
    ) -> Result<JsonObject, AcquisitionError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                service: "DOM capture",
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(extract_fields(&body, selectors))
    }
}

/// Apply selectors to an HTML document. Unmatched or invalid selectors yield no key.
pub fn extract_fields(html: &str, selectors: &[SelectorSpec]) -> JsonObject {
    let document = Html::parse_document(html);
    let mut out = JsonObject::new();

    for spec in selectors {
        let Ok(selector) = Selector::parse(spec.css) else {
            tracing::debug!(css = spec.css, "Skipping invalid selector");
            continue;
        };

        match spec.extract {
            Extract::Text => {
                let text = document
                    .select(&selector)
                    .map(element_text)
                    .find(|t| !t.is_empty());
                if let Some(text) = text {
                    out.insert(spec.key.to_string(), Value::String(text));
                }
            }
            Extract::Attr(attr) => {
                let value = document
                    .select(&selector)
                    .find_map(|el| el.value().attr(attr))
                    .map(str::trim)
                    .filter(|v| !v.is_empty());
                if let Some(value) = value {
                    out.insert(spec.key.to_string(), Value::String(absolutize(value)));
                }
            }
            Extract::Rows => {
                let rows = table_rows(&document, &selector);
                if !rows.is_empty() {
                    out.insert(spec.key.to_string(), Value::Object(rows));
                }
            }
        }
    }

    out
}

fn table_rows(document: &Html, rows: &Selector) -> JsonObject {
    let mut out = JsonObject::new();
    let (Ok(th), Ok(td)) = (Selector::parse("th"), Selector::parse("td")) else {
        return out;
    };

    for row in document.select(rows) {
        let key = row.select(&th).next().map(element_text).unwrap_or_default();
        let value = row.select(&td).next().map(element_text).unwrap_or_default();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let key = key.to_lowercase().replace(' ', "_");
        out.insert(key, Value::String(value));
    }
    out
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Protocol-relative image URLs are common on wiki pages
fn absolutize(value: &str) -> String {
    if let Some(rest) = value.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        value.to_string()
    }
}
