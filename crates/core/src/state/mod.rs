//! # Duel Session State
//!
//! A [`DuelSession`] is created once per duel request and mutated in place as
//! stages complete. Stores hand out clones; all writes go through
//! [`SessionStore::update`], which applies a mutation atomically per key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duel::DuelStatus;
use crate::error::StoreError;
use crate::narrative::BattleCommentary;
use crate::scoring::{FighterRecord, Winner};

pub mod db;
pub mod memory;

pub use db::SqliteSessionStore;
pub use memory::MemorySessionStore;

/// One entry of the append-only processing log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingLog {
    pub timestamp: DateTime<Utc>,
    pub stage: DuelStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProcessingLog {
    pub fn new(stage: DuelStatus, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            stage,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Full state of one duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: DuelStatus,
    pub url1: String,
    pub url2: String,
    pub fighter1: Option<FighterRecord>,
    pub fighter2: Option<FighterRecord>,
    pub commentary: Option<BattleCommentary>,
    pub winner: Option<Winner>,
    pub winner_name: Option<String>,
    pub logs: Vec<ProcessingLog>,
}

impl DuelSession {
    /// Fresh pending session with a random UUID
    pub fn new(url1: impl Into<String>, url2: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            status: DuelStatus::Pending,
            url1: url1.into(),
            url2: url2.into(),
            fighter1: None,
            fighter2: None,
            commentary: None,
            winner: None,
            winner_name: None,
            logs: Vec::new(),
        }
    }
}

/// Mutation applied to a session under the store's write guard
pub type SessionMutation = Box<dyn FnOnce(&mut DuelSession) + Send>;

/// Keyed session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create and persist a new pending session
    async fn create(&self, url1: &str, url2: &str) -> Result<DuelSession, StoreError>;

    /// Snapshot of a session, `None` if unknown
    async fn get(&self, id: &str) -> Result<Option<DuelSession>, StoreError>;

    /// Apply `mutation` atomically. Fails with [`StoreError::NotFound`] for unknown ids.
    async fn update(&self, id: &str, mutation: SessionMutation) -> Result<(), StoreError>;

    async fn health(&self) -> bool {
        true
    }

    /// Append a log entry
    async fn append_log(
        &self,
        id: &str,
        stage: DuelStatus,
        message: &str,
        data: Option<Value>,
    ) -> Result<(), StoreError> {
        let mut entry = ProcessingLog::new(stage, message);
        entry.data = data;
        self.update(id, Box::new(move |session| session.logs.push(entry)))
            .await
    }

    /// Move to `status` and record why
    async fn set_status(
        &self,
        id: &str,
        status: DuelStatus,
        message: &str,
    ) -> Result<(), StoreError> {
        let entry = ProcessingLog::new(status, message);
        self.update(
            id,
            Box::new(move |session| {
                session.status = status;
                session.logs.push(entry);
            }),
        )
        .await
    }
}
