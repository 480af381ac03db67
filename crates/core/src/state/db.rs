//! # SQLite Session Store
//!
//! Sessions as JSON documents in a single table, with the status and
//! timestamps lifted into columns for inspection. Defaults to an in-memory
//! database; pass a path to keep sessions in a file.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{DuelSession, SessionMutation, SessionStore};
use crate::error::StoreError;

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Session store backed by rusqlite
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open or create a database file
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
            }
        }
        Self::from_connection(Connection::open(path.as_ref())?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Backend(format!("Lock error: {}", e)))
    }

    /// Run schema migrations
    fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            Self::migrate_v1(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }

    /// Migration to version 1 - duel sessions
    fn migrate_v1(conn: &Connection) -> Result<(), StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS duel_sessions (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                data TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_duel_sessions_status ON duel_sessions(status)",
            [],
        )?;
        Ok(())
    }

    fn read(conn: &Connection, id: &str) -> Result<Option<DuelSession>, StoreError> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM duel_sessions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    fn write(conn: &Connection, session: &DuelSession) -> Result<(), StoreError> {
        let data = serde_json::to_string(session)?;
        let status = serde_json::to_value(session.status)?
            .as_str()
            .unwrap_or_default()
            .to_string();
        conn.execute(
            r#"
            INSERT INTO duel_sessions (id, status, created_at, updated_at, data)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                updated_at = excluded.updated_at,
                data = excluded.data
            "#,
            params![
                session.id,
                status,
                session.created_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
                data
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, url1: &str, url2: &str) -> Result<DuelSession, StoreError> {
        let session = DuelSession::new(url1, url2);
        let conn = self.lock()?;
        Self::write(&conn, &session)?;
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<Option<DuelSession>, StoreError> {
        let conn = self.lock()?;
        Self::read(&conn, id)
    }

    async fn update(&self, id: &str, mutation: SessionMutation) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let mut session =
            Self::read(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        mutation(&mut session);
        Self::write(&conn, &session)
    }

    async fn health(&self) -> bool {
        match self.lock() {
            Ok(conn) => conn
                .query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duel::DuelStatus;

    #[tokio::test]
    async fn test_roundtrip_in_memory() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let session = store.create("https://a.dev", "https://b.dev").await.unwrap();

        store
            .set_status(&session.id, DuelStatus::Normalizing, "Decoding fighter data")
            .await
            .unwrap();

        let loaded = store.get(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, DuelStatus::Normalizing);
        assert_eq!(loaded.url2, "https://b.dev");
        assert_eq!(loaded.logs.len(), 1);
        assert!(store.health().await);
    }

    #[tokio::test]
    async fn test_status_column_tracks_session() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let session = store.create("u1", "u2").await.unwrap();
        store
            .set_status(&session.id, DuelStatus::GeneratingCommentary, "Roasting")
            .await
            .unwrap();

        let conn = store.lock().unwrap();
        let status: String = conn
            .query_row(
                "SELECT status FROM duel_sessions WHERE id = ?1",
                params![session.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(status, "generating_commentary");
    }

    #[tokio::test]
    async fn test_update_missing_session() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let err = store
            .update("nope", Box::new(|s| s.status = DuelStatus::Error))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_file_database_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("duels.db");

        let id = {
            let store = SqliteSessionStore::open_at(&path).unwrap();
            store.create("u1", "u2").await.unwrap().id
        };

        let store = SqliteSessionStore::open_at(&path).unwrap();
        let loaded = store.get(&id).await.unwrap();
        assert!(loaded.is_some());
    }
}
