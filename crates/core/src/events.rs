//! # Duel Events
//!
//! Progress telemetry for live observers. Events are broadcast only, never
//! persisted: a subscriber sees what is published while it is subscribed,
//! with no replay for late joiners.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::duel::DuelStatus;

/// One progress update for a duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub session_id: String,
    pub stage: DuelStatus,
    pub message: String,
    /// Percentage in `0..=100`
    pub progress: u8,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ProgressEvent {
    /// Create a new event
    pub fn new(session_id: &str, stage: DuelStatus, message: impl Into<String>, progress: u8) -> Self {
        Self {
            session_id: session_id.to_string(),
            stage,
            message: message.into(),
            progress: progress.min(100),
            timestamp: Utc::now(),
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether this event belongs to `session_id`
    pub fn is_for(&self, session_id: &str) -> bool {
        self.session_id == session_id
    }
}

/// Pub/sub seam injected into the coordinator
pub trait EventBus: Send + Sync {
    /// Fan the event out to current subscribers. Never blocks, never fails.
    fn publish(&self, event: ProgressEvent);
}

/// [`EventBus`] over a tokio broadcast channel. Subscribers filter by session.
#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: ProgressEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

/// Bus that keeps every event, for inspection
#[derive(Default)]
pub struct RecordingEventBus {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventBus for RecordingEventBus {
    fn publish(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
