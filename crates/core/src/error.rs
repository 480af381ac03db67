//! # Error Types
//!
//! Boundary errors for the duel pipeline and its collaborators.
//!
//! Acquisition and narrative failures are always recoverable (the resolver and
//! generator substitute fallbacks), so they never escape `run_duel`. Only
//! [`DuelError`] reaches callers of the coordinator.

use std::time::Duration;

use thiserror::Error;

/// Failure of a real acquisition procedure
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0} returned an empty payload")]
    EmptyPayload(&'static str),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("cannot derive an identifier from {0}")]
    InvalidUrl(String),

    #[error("acquired profile has no identity ({0})")]
    MissingIdentity(&'static str),
}

/// Failure of the language-model collaborator
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("no narrative client configured")]
    NotConfigured,

    #[error("narrative generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("narrative request failed: {0}")]
    Request(String),

    #[error("narrative provider returned HTTP {0}")]
    Status(u16),

    #[error("malformed narrative: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for NarrativeError {
    fn from(e: reqwest::Error) -> Self {
        NarrativeError::Request(e.to_string())
    }
}

/// Failure of a session store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session {0} not found")]
    NotFound(String),

    #[error("session store backend error: {0}")]
    Backend(String),

    #[error("session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Fatal pipeline error surfaced to the caller of the coordinator
#[derive(Debug, Error)]
pub enum DuelError {
    #[error("Session {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for DuelError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => DuelError::NotFound(id),
            other => DuelError::Store(other),
        }
    }
}

impl DuelError {
    /// Whether this error means the session does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DuelError::NotFound(_))
    }
}
