//! # Duel Coordinator
//!
//! Drives one duel through the [`DuelStatus`] stages. Every stage entry
//! updates the session, appends a log entry and broadcasts a
//! [`ProgressEvent`]. Per-fighter failures are absorbed by acquisition and
//! narrative fallbacks; anything else ends the session in `error`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::pipeline::{DuelStatus, Pipeline};
use super::ticker::CommentaryTicker;
use crate::acquisition::{
    collaborator, resolve, AcquisitionResolver, BrightDataClient, GitHubClient, HtmlDomCapture,
    RawAcquisition, WikipediaClient,
};
use crate::config::DuelConfig;
use crate::error::DuelError;
use crate::events::{EventBus, ProgressEvent};
use crate::narrative::{BattleCommentary, NarrativeGenerator};
use crate::profile::{normalize, CanonicalProfile};
use crate::scoring::{FighterRecord, FighterSlot, ScoringEngine, Winner};
use crate::state::{
    DuelSession, MemorySessionStore, ProcessingLog, SessionStore, SqliteSessionStore,
};

/// Final view of a duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelResult {
    pub id: String,
    pub status: DuelStatus,
    pub fighter1: Option<FighterRecord>,
    pub fighter2: Option<FighterRecord>,
    pub commentary: Option<BattleCommentary>,
    pub winner: Option<Winner>,
    /// Winner's display name, `Draw` for a draw
    pub winner_name: Option<String>,
}

impl From<DuelSession> for DuelResult {
    fn from(session: DuelSession) -> Self {
        Self {
            id: session.id,
            status: session.status,
            fighter1: session.fighter1,
            fighter2: session.fighter2,
            commentary: session.commentary,
            winner: session.winner,
            winner_name: session.winner_name,
        }
    }
}

/// Polling view of a duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelStatusReport {
    pub id: String,
    pub status: DuelStatus,
    pub progress: u8,
    pub logs: Vec<ProcessingLog>,
}

/// Runs duels end to end
pub struct DuelCoordinator {
    store: Arc<dyn SessionStore>,
    resolver: AcquisitionResolver,
    scoring: ScoringEngine,
    narrative: NarrativeGenerator,
    events: Arc<dyn EventBus>,
    ticker_interval: Duration,
}

impl DuelCoordinator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        resolver: AcquisitionResolver,
        scoring: ScoringEngine,
        narrative: NarrativeGenerator,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            store,
            resolver,
            scoring,
            narrative,
            events,
            ticker_interval: Duration::from_millis(4000),
        }
    }

    pub fn with_ticker_interval(mut self, interval: Duration) -> Self {
        self.ticker_interval = interval;
        self
    }

    /// Wire the real collaborators described by `config`
    pub fn from_config(config: &DuelConfig, events: Arc<dyn EventBus>) -> Result<Self, DuelError> {
        let store: Arc<dyn SessionStore> = match &config.session_db {
            Some(path) => {
                tracing::info!("Opening session database at {}", path.display());
                Arc::new(SqliteSessionStore::open_at(path)?)
            }
            None => Arc::new(MemorySessionStore::new()),
        };

        let resolver = AcquisitionResolver::new(
            Arc::new(BrightDataClient::new(config.bright_data.clone())),
            Arc::new(GitHubClient::new(config.github.clone())),
            Arc::new(WikipediaClient::new(config.wikipedia.clone())),
            Arc::new(HtmlDomCapture::new(&config.dom)),
            Arc::clone(&store),
        );

        Ok(Self::new(
            store,
            resolver,
            ScoringEngine::default(),
            NarrativeGenerator::from_config(config),
            events,
        )
        .with_ticker_interval(Duration::from_millis(config.ticker_interval_ms.max(1))))
    }

    /// Create a pending session without running it
    pub async fn create_session(&self, url1: &str, url2: &str) -> Result<DuelSession, DuelError> {
        Ok(self.store.create(url1, url2).await?)
    }

    /// Run a full duel. With `existing_id` the session must already exist.
    #[tracing::instrument(skip(self), fields(duel_id = tracing::field::Empty))]
    pub async fn run_duel(
        &self,
        url1: &str,
        url2: &str,
        existing_id: Option<&str>,
    ) -> Result<DuelResult, DuelError> {
        let mut pipeline = Pipeline::new();
        let id = match existing_id {
            Some(id) => match self.store.get(id).await {
                Ok(Some(_)) => id.to_string(),
                Ok(None) => {
                    let err = DuelError::NotFound(id.to_string());
                    self.fail(id, &mut pipeline, &err).await;
                    return Err(err);
                }
                Err(e) => {
                    let err = DuelError::from(e);
                    self.fail(id, &mut pipeline, &err).await;
                    return Err(err);
                }
            },
            None => self.store.create(url1, url2).await?.id,
        };
        tracing::Span::current().record("duel_id", id.as_str());

        self.resolver.begin_duel(&id);
        let outcome = self.execute(&id, url1, url2, &mut pipeline).await;
        self.resolver.end_duel(&id);

        match outcome {
            Ok(result) => {
                tracing::info!(winner = ?result.winner, "Duel complete");
                Ok(result)
            }
            Err(e) => {
                tracing::error!(stage = %pipeline.stage, "Duel failed: {}", e);
                self.fail(&id, &mut pipeline, &e).await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        id: &str,
        url1: &str,
        url2: &str,
        pipeline: &mut Pipeline,
    ) -> Result<DuelResult, DuelError> {
        // Scraping
        self.enter(id, pipeline.advance(), "Initiating profile reconnaissance...")
            .await?;
        for (slot, url, progress) in [(FighterSlot::First, url1, 10), (FighterSlot::Second, url2, 12)] {
            let platform = resolve(url);
            self.broadcast(
                id,
                DuelStatus::Scraping,
                format!(
                    "Fighter {}: Using {} for {}...",
                    slot.number(),
                    collaborator(platform),
                    platform
                ),
                progress,
            );
        }
        let (raw1, raw2) = tokio::join!(
            self.acquire(id, url1, FighterSlot::First, 25),
            self.acquire(id, url2, FighterSlot::Second, 30),
        );
        self.broadcast(id, DuelStatus::Scraping, "Both profiles scraped successfully ✓", 35);

        // Normalizing
        self.enter(id, pipeline.advance(), "Processing warrior data...").await?;
        let profile1 = normalize(&raw1);
        self.identified(id, FighterSlot::First, &profile1, 45);
        let profile2 = normalize(&raw2);
        self.identified(id, FighterSlot::Second, &profile2, 50);

        // Scoring
        self.enter(id, pipeline.advance(), "Calculating power levels...").await?;
        let stats1 = self.scoring.score(&profile1);
        self.broadcast(
            id,
            DuelStatus::Scoring,
            format!("{}: Power level {}", profile1.name, self.scoring.aggregate(&stats1)),
            60,
        );
        let stats2 = self.scoring.score(&profile2);
        self.broadcast(
            id,
            DuelStatus::Scoring,
            format!("{}: Power level {}", profile2.name, self.scoring.aggregate(&stats2)),
            65,
        );

        // Transforming
        self.enter(id, pipeline.advance(), "Awakening warrior spirits...").await?;
        let fighter1 = self.scoring.transform(profile1, stats1);
        self.awakened(id, &fighter1, 73);
        let fighter2 = self.scoring.transform(profile2, stats2);
        self.awakened(id, &fighter2, 76);

        let (stored1, stored2) = (fighter1.clone(), fighter2.clone());
        self.store
            .update(
                id,
                Box::new(move |session| {
                    session.fighter1 = Some(stored1);
                    session.fighter2 = Some(stored2);
                }),
            )
            .await?;
        self.broadcast(id, DuelStatus::Transforming, "Warrior profiles sealed ✓", 78);

        let decision = self.scoring.decide_winner(fighter1.power, fighter2.power);
        let winner_name = match decision.winner {
            Winner::First => fighter1.profile.name.clone(),
            Winner::Second => fighter2.profile.name.clone(),
            Winner::Draw => "Draw".to_string(),
        };
        self.broadcast(
            id,
            DuelStatus::Transforming,
            format!("Power levels compared ({} vs {}), preparing arena...", fighter1.power, fighter2.power),
            80,
        );

        // Generating commentary
        self.enter(
            id,
            pipeline.advance(),
            "The announcer prepares the battle narrative...",
        )
        .await?;
        for (fighter, progress) in [(&fighter1, 84), (&fighter2, 86)] {
            self.broadcast(
                id,
                DuelStatus::GeneratingCommentary,
                format!(
                    "{} the {} steps up: {}",
                    fighter.profile.name,
                    fighter.archetype.label(),
                    fighter.special_ability
                ),
                progress,
            );
        }
        let commentary = self
            .narrate(id, &fighter1, &fighter2, decision.winner)
            .await;

        let stored = commentary.clone();
        self.store
            .update(id, Box::new(move |session| session.commentary = Some(stored)))
            .await?;
        self.broadcast(id, DuelStatus::GeneratingCommentary, "Battle commentary ready ✓", 95);

        // Complete
        let (winner, name) = (decision.winner, winner_name.clone());
        self.store
            .update(
                id,
                Box::new(move |session| {
                    session.winner = Some(winner);
                    session.winner_name = Some(name);
                }),
            )
            .await?;
        let message = match decision.winner {
            Winner::Draw => "BATTLE COMPLETE! It's a draw!".to_string(),
            _ => format!("BATTLE COMPLETE! {} is victorious!", winner_name),
        };
        let status = pipeline.advance();
        self.enter(id, status, &message).await?;

        Ok(DuelResult {
            id: id.to_string(),
            status,
            fighter1: Some(fighter1),
            fighter2: Some(fighter2),
            commentary: Some(commentary),
            winner: Some(decision.winner),
            winner_name: Some(winner_name),
        })
    }

    async fn acquire(&self, id: &str, url: &str, slot: FighterSlot, progress: u8) -> RawAcquisition {
        let raw = self.resolver.acquire(url, id, slot).await;
        self.broadcast(
            id,
            DuelStatus::Scraping,
            format!("Fighter {} data collected ✓", slot.number()),
            progress,
        );
        raw
    }

    /// Narrative with the flavor ticker running until it resolves
    async fn narrate(
        &self,
        id: &str,
        fighter1: &FighterRecord,
        fighter2: &FighterRecord,
        winner: Winner,
    ) -> BattleCommentary {
        let narrative = self.narrative.generate(fighter1, fighter2, winner);
        tokio::pin!(narrative);

        let mut ticker = CommentaryTicker::new();
        let mut interval = interval_at(Instant::now() + self.ticker_interval, self.ticker_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                commentary = &mut narrative => break commentary,
                _ = interval.tick() => {
                    if let Some((progress, message)) = ticker.tick() {
                        self.broadcast(id, DuelStatus::GeneratingCommentary, message, progress);
                    }
                }
            }
        }
    }

    fn identified(&self, id: &str, slot: FighterSlot, profile: &CanonicalProfile, progress: u8) {
        self.events.publish(
            ProgressEvent::new(
                id,
                DuelStatus::Normalizing,
                format!("Identified: {}, {}", profile.name, profile.title),
                progress,
            )
            .with_data(json!({
                "fighter": slot.number(),
                "name": profile.name,
                "avatar": profile.avatar,
            })),
        );
    }

    fn awakened(&self, id: &str, fighter: &FighterRecord, progress: u8) {
        self.broadcast(
            id,
            DuelStatus::Transforming,
            format!(
                "{} awakens as {} (Power: {})",
                fighter.profile.name,
                fighter.archetype.label(),
                fighter.power
            ),
            progress,
        );
    }

    /// Stage entry: status, log entry and broadcast
    async fn enter(&self, id: &str, status: DuelStatus, message: &str) -> Result<(), DuelError> {
        self.store.set_status(id, status, message).await?;
        self.broadcast(id, status, message, status.entry_progress());
        tracing::info!(stage = %status, "{}", message);
        Ok(())
    }

    fn broadcast(&self, id: &str, stage: DuelStatus, message: impl Into<String>, progress: u8) {
        self.events
            .publish(ProgressEvent::new(id, stage, message, progress));
    }

    /// Error path: broadcast first, then record the status if the session exists
    async fn fail(&self, id: &str, pipeline: &mut Pipeline, error: &DuelError) {
        pipeline.fail();
        tracing::debug!(stages = ?pipeline.history(), "Pipeline stopped");
        let message = format!("Battle interrupted: {}", error);
        self.broadcast(id, pipeline.stage, message.as_str(), 0);
        if error.is_not_found() {
            return;
        }
        if let Err(e) = self.store.set_status(id, pipeline.stage, &message).await {
            tracing::warn!("Could not record error status for {}: {}", id, e);
        }
    }

    pub async fn get_status(&self, id: &str) -> Result<DuelStatusReport, DuelError> {
        let session = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| DuelError::NotFound(id.to_string()))?;
        Ok(DuelStatusReport {
            id: session.id,
            status: session.status,
            progress: session.status.progress(),
            logs: session.logs,
        })
    }

    pub async fn get_result(&self, id: &str) -> Result<Option<DuelResult>, DuelError> {
        Ok(self.store.get(id).await?.map(DuelResult::from))
    }

    /// Liveness of the store and every collaborator
    pub async fn health_check(&self) -> BTreeMap<String, bool> {
        let (store, narrative, collaborators) = tokio::join!(
            self.store.health(),
            self.narrative.health(),
            self.resolver.health(),
        );
        let mut report: BTreeMap<String, bool> = collaborators
            .into_iter()
            .map(|(name, ok)| (name.to_string(), ok))
            .collect();
        report.insert("session_store".to_string(), store);
        report.insert("narrative".to_string(), narrative);
        report
    }
}
