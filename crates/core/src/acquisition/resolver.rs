//! # Acquisition Resolver
//!
//! Maps a URL to its platform and runs the matching procedure. Any failure
//! is absorbed: the resolver logs the cause on the session and hands back a
//! synthetic profile instead, so [`AcquisitionResolver::acquire`] never fails.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::dom::SelectorSpec;
use super::wikitext::parse_infobox;
use super::{
    CodeHostApi, DomCapture, EncyclopediaApi, JsonObject, Platform, RawAcquisition,
    SyntheticCatalog, WebCapture,
};
use crate::duel::DuelStatus;
use crate::error::AcquisitionError;
use crate::random::{RandomSource, ThreadRandom};
use crate::scoring::FighterSlot;
use crate::state::SessionStore;

static GITHUB_LOGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"github\.com/([^/?#]+)").expect("valid regex"));
static WIKIPEDIA_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wikipedia\.org/wiki/([^#?]+)").expect("valid regex"));

const GITHUB_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec::text("name", ".vcard-fullname"),
    SelectorSpec::text("bio", ".p-note.user-profile-bio"),
    SelectorSpec::text("location", ".p-label"),
    SelectorSpec::text("company", ".p-org"),
    SelectorSpec::text("contributions", ".js-yearly-contributions h2"),
];

const WIKIPEDIA_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec::text("title", "#firstHeading"),
    SelectorSpec::text("first_paragraph", ".mw-parser-output > p:not(.mw-empty-elt)"),
    SelectorSpec::attr("image", ".infobox img", "src"),
    SelectorSpec::rows("infobox_rows", ".infobox tr"),
];

/// Platform for a URL, by case-insensitive host substring
pub fn resolve(url: &str) -> Platform {
    let url = url.to_lowercase();
    if url.contains("linkedin.com") {
        Platform::LinkedIn
    } else if url.contains("github.com") {
        Platform::GitHub
    } else if url.contains("wikipedia.org") {
        Platform::Wikipedia
    } else {
        Platform::Generic
    }
}

/// Human name of the collaborator behind a platform, used in fallback logs
pub fn collaborator(platform: Platform) -> &'static str {
    match platform {
        Platform::LinkedIn | Platform::Generic => "Bright Data",
        Platform::GitHub => "GitHub",
        Platform::Wikipedia => "Wikipedia",
    }
}

/// Per-platform acquisition with synthetic fallback
pub struct AcquisitionResolver {
    web: Arc<dyn WebCapture>,
    code_host: Arc<dyn CodeHostApi>,
    encyclopedia: Arc<dyn EncyclopediaApi>,
    dom: Arc<dyn DomCapture>,
    store: Arc<dyn SessionStore>,
    catalog: SyntheticCatalog,
    random: Arc<dyn RandomSource>,
    /// Synthetic entries already handed out, per duel
    used: Mutex<HashMap<String, HashSet<usize>>>,
}

impl AcquisitionResolver {
    pub fn new(
        web: Arc<dyn WebCapture>,
        code_host: Arc<dyn CodeHostApi>,
        encyclopedia: Arc<dyn EncyclopediaApi>,
        dom: Arc<dyn DomCapture>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            web,
            code_host,
            encyclopedia,
            dom,
            store,
            catalog: SyntheticCatalog::default(),
            random: Arc::new(ThreadRandom),
            used: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_catalog(mut self, catalog: SyntheticCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Reset the synthetic used-set for a duel run
    pub fn begin_duel(&self, duel_id: &str) {
        if let Ok(mut used) = self.used.lock() {
            used.insert(duel_id.to_string(), HashSet::new());
        }
    }

    /// Drop the synthetic used-set for a finished duel
    pub fn end_duel(&self, duel_id: &str) {
        if let Ok(mut used) = self.used.lock() {
            used.remove(duel_id);
        }
    }

    /// Acquire one fighter's profile. Never fails.
    #[tracing::instrument(skip(self), fields(platform = tracing::field::Empty))]
    pub async fn acquire(&self, url: &str, duel_id: &str, slot: FighterSlot) -> RawAcquisition {
        let platform = resolve(url);
        tracing::Span::current().record("platform", platform.as_str());

        match self.acquire_real(url, platform).await {
            Ok(payload) => {
                tracing::info!(fighter = slot.number(), "Acquired real profile");
                RawAcquisition::new(platform, url, payload)
            }
            Err(e) => {
                let name = collaborator(platform);
                tracing::warn!(fighter = slot.number(), "[{}] acquisition failed: {}", name, e);
                let message = format!("[{}] Failed: {}, using demo data", name, e);
                if let Err(log_err) = self
                    .store
                    .append_log(
                        duel_id,
                        DuelStatus::Scraping,
                        &message,
                        Some(json!({ "fighter": slot.number() })),
                    )
                    .await
                {
                    tracing::warn!("Could not record fallback on session: {}", log_err);
                }
                self.synthesize(url, platform, duel_id)
            }
        }
    }

    async fn acquire_real(&self, url: &str, platform: Platform) -> Result<JsonObject, AcquisitionError> {
        match platform {
            Platform::LinkedIn | Platform::Generic => self.web.capture(url, platform).await,
            Platform::GitHub => self.acquire_github(url).await,
            Platform::Wikipedia => self.acquire_wikipedia(url).await,
        }
    }

    /// User metadata, DOM overrides, then repositories
    async fn acquire_github(&self, url: &str) -> Result<JsonObject, AcquisitionError> {
        let login = GITHUB_LOGIN
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| AcquisitionError::InvalidUrl(url.to_string()))?;
        let page = format!("https://github.com/{}", login);

        let (dom, user, repos) = tokio::join!(
            self.dom.extract(&page, GITHUB_SELECTORS),
            self.code_host.fetch_user(&login),
            self.code_host.fetch_repositories(&login),
        );

        let mut merged = JsonObject::new();
        let mut sources = Vec::new();

        match user {
            Ok(user) => {
                merged.extend(user);
                sources.push("api");
            }
            Err(e) => tracing::warn!(%login, "GitHub user fetch failed: {}", e),
        }
        match dom {
            Ok(fields) => {
                merged.extend(fields);
                sources.push("dom");
            }
            Err(e) => tracing::warn!(%login, "GitHub page capture failed: {}", e),
        }
        let repositories = match repos {
            Ok(repos) => {
                sources.push("repos");
                repos
            }
            Err(e) => {
                tracing::warn!(%login, "GitHub repository fetch failed: {}", e);
                Vec::new()
            }
        };
        merged.insert("repositories".into(), Value::Array(repositories));
        merged.insert("_sources".into(), json!(sources));

        if !merged.contains_key("login") && !merged.contains_key("name") {
            return Err(AcquisitionError::MissingIdentity("GitHub login/name"));
        }
        Ok(merged)
    }

    /// DOM fields, summary overrides; wikitext infobox overrides DOM rows
    async fn acquire_wikipedia(&self, url: &str) -> Result<JsonObject, AcquisitionError> {
        let encoded = WIKIPEDIA_TITLE
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| AcquisitionError::InvalidUrl(url.to_string()))?;
        let title = urlencoding::decode(&encoded)
            .map(|t| t.into_owned())
            .unwrap_or(encoded)
            .replace('_', " ");

        let (summary, wikitext, dom) = tokio::join!(
            self.encyclopedia.fetch_summary(&title),
            self.encyclopedia.fetch_wikitext(&title),
            self.dom.extract(url, WIKIPEDIA_SELECTORS),
        );

        let mut merged = JsonObject::new();
        let mut infobox = JsonObject::new();

        match dom {
            Ok(mut fields) => {
                if let Some(Value::Object(rows)) = fields.remove("infobox_rows") {
                    infobox.extend(rows);
                }
                merged.extend(fields);
            }
            Err(e) => tracing::warn!(%title, "Wikipedia page capture failed: {}", e),
        }
        match summary {
            Ok(fields) => merged.extend(fields),
            Err(e) => tracing::warn!(%title, "Wikipedia summary fetch failed: {}", e),
        }
        match wikitext {
            Ok(text) => infobox.extend(parse_infobox(&text)),
            Err(e) => tracing::warn!(%title, "Wikipedia wikitext fetch failed: {}", e),
        }
        if !infobox.is_empty() {
            merged.insert("infobox".into(), Value::Object(infobox));
        }

        let has_identity = ["title", "name", "intro", "first_paragraph"]
            .iter()
            .any(|k| merged.contains_key(*k));
        if !has_identity {
            return Err(AcquisitionError::MissingIdentity("Wikipedia title/intro"));
        }
        Ok(merged)
    }

    fn synthesize(&self, url: &str, platform: Platform, duel_id: &str) -> RawAcquisition {
        let index = match self.used.lock() {
            // Unregistered duels select from a throwaway set
            Ok(mut used) => match used.get_mut(duel_id) {
                Some(set) => self.catalog.select(set, self.random.as_ref()),
                None => self.catalog.select(&mut HashSet::new(), self.random.as_ref()),
            },
            Err(_) => self.random.pick(self.catalog.len().max(1)),
        };
        tracing::info!(index, "Using synthetic profile");
        self.catalog.materialize(index, url, platform)
    }

    /// Health of each acquisition collaborator
    pub async fn health(&self) -> Vec<(&'static str, bool)> {
        let (web, code_host, encyclopedia) = tokio::join!(
            self.web.health(),
            self.code_host.health(),
            self.encyclopedia.health(),
        );
        vec![
            ("web_capture", web),
            ("code_host", code_host),
            ("encyclopedia", encyclopedia),
        ]
    }
}
