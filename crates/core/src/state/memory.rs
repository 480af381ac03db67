//! In-process session store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DuelSession, SessionMutation, SessionStore};
use crate::error::StoreError;

/// HashMap behind a tokio `RwLock`; the write guard is held for the whole
/// mutation, so one session never sees interleaved writers.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, DuelSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, url1: &str, url2: &str) -> Result<DuelSession, StoreError> {
        let session = DuelSession::new(url1, url2);
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<Option<DuelSession>, StoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, mutation: SessionMutation) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        mutation(session);
        Ok(())
    }
}
