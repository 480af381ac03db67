//! # Roast Narrative
//!
//! Turns two fighter records into a six-round roast battle. The language
//! model is asked for JSON, the answer goes through [`repair::repair`], and
//! any failure (no key, timeout, transport, malformed output) degrades to
//! the fixed [`fallback::fallback_commentary`].

mod client;
mod fallback;
mod prompt;
pub mod repair;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use client::{ChatMessage, CompletionRequest, NarrativeClient, OpenAiCompatibleClient};
#[cfg(test)]
pub use client::MockNarrativeClient;
pub use fallback::fallback_commentary;
pub use prompt::{matchup, SYSTEM_PROMPT};
pub use repair::{infer_attacker, RepairReport};

use crate::config::{DuelConfig, NarrativeSettings};
use crate::error::NarrativeError;
use crate::scoring::{FighterRecord, FighterSlot, Winner};

/// One exchange of insults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoastRound {
    pub round_number: u8,
    pub attacker: FighterSlot,
    pub roast: String,
    /// Always within `30..=95`
    pub damage: u8,
    pub reaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleCommentary {
    pub introduction: String,
    pub rounds: Vec<RoastRound>,
    pub verdict: String,
    pub winner: Winner,
}

/// Produces commentary, with or without a model behind it
#[derive(Clone)]
pub struct NarrativeGenerator {
    client: Option<Arc<dyn NarrativeClient>>,
    model: String,
    settings: NarrativeSettings,
}

impl NarrativeGenerator {
    pub fn new(
        client: Option<Arc<dyn NarrativeClient>>,
        model: impl Into<String>,
        settings: NarrativeSettings,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            settings,
        }
    }

    /// Generator for the configured provider; fallback-only when its key is unset
    pub fn from_config(config: &DuelConfig) -> Self {
        let client = OpenAiCompatibleClient::from_model_config(&config.model)
            .map(|c| Arc::new(c) as Arc<dyn NarrativeClient>);
        if client.is_none() {
            tracing::warn!(
                "{} not set, using fallback commentary",
                config.model.provider.api_key_env()
            );
        }
        Self::new(client, config.model.model.clone(), config.narrative.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Configured and the provider answers its probe
    pub async fn health(&self) -> bool {
        match &self.client {
            Some(client) => client.health().await,
            None => false,
        }
    }

    /// Never fails: any error yields the fallback commentary
    pub async fn generate(
        &self,
        fighter1: &FighterRecord,
        fighter2: &FighterRecord,
        winner: Winner,
    ) -> BattleCommentary {
        match self.try_generate(fighter1, fighter2, winner).await {
            Ok((commentary, report)) => {
                if !report.is_clean() {
                    tracing::info!(?report, "Repaired model commentary");
                }
                commentary
            }
            Err(NarrativeError::NotConfigured) => {
                fallback_commentary(&fighter1.profile.name, &fighter2.profile.name, winner)
            }
            Err(e) => {
                tracing::warn!("Narrative generation failed, using fallback: {}", e);
                fallback_commentary(&fighter1.profile.name, &fighter2.profile.name, winner)
            }
        }
    }

    /// Model path only, bounded by the configured timeout
    #[tracing::instrument(skip_all, fields(model = %self.model))]
    pub async fn try_generate(
        &self,
        fighter1: &FighterRecord,
        fighter2: &FighterRecord,
        winner: Winner,
    ) -> Result<(BattleCommentary, RepairReport), NarrativeError> {
        let client = self.client.as_ref().ok_or(NarrativeError::NotConfigured)?;
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(matchup(fighter1, fighter2)),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let deadline = Duration::from_secs(self.settings.timeout_secs);
        let content = tokio::time::timeout(deadline, client.complete(&request))
            .await
            .map_err(|_| NarrativeError::Timeout(deadline))??;

        repair::repair(
            &content,
            &fighter1.profile.name,
            &fighter2.profile.name,
            winner,
        )
    }
}
