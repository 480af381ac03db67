//! # Duel Pipeline Stages
//!
//! The status state machine a duel walks through. Stages only move forward;
//! `Error` is reachable from any non-terminal stage.

use serde::{Deserialize, Serialize};

/// Status of a duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelStatus {
    /// Session created, pipeline not started
    Pending,
    /// Acquiring both profiles
    Scraping,
    /// Mapping raw payloads into canonical profiles
    Normalizing,
    /// Computing battle statistics
    Scoring,
    /// Building fighter records and deciding the winner
    Transforming,
    /// Waiting on the roast narrative
    GeneratingCommentary,
    /// Done
    Complete,
    /// Failed
    Error,
}

impl DuelStatus {
    /// The stage that follows this one on the happy path
    pub fn next(&self) -> DuelStatus {
        match self {
            DuelStatus::Pending => DuelStatus::Scraping,
            DuelStatus::Scraping => DuelStatus::Normalizing,
            DuelStatus::Normalizing => DuelStatus::Scoring,
            DuelStatus::Scoring => DuelStatus::Transforming,
            DuelStatus::Transforming => DuelStatus::GeneratingCommentary,
            DuelStatus::GeneratingCommentary => DuelStatus::Complete,
            DuelStatus::Complete => DuelStatus::Complete,
            DuelStatus::Error => DuelStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DuelStatus::Complete | DuelStatus::Error)
    }

    /// Coarse progress reported by status polling
    pub fn progress(&self) -> u8 {
        match self {
            DuelStatus::Pending => 0,
            DuelStatus::Scraping => 20,
            DuelStatus::Normalizing => 40,
            DuelStatus::Scoring => 55,
            DuelStatus::Transforming => 70,
            DuelStatus::GeneratingCommentary => 85,
            DuelStatus::Complete => 100,
            DuelStatus::Error => 0,
        }
    }

    /// Progress broadcast when the stage is entered
    pub fn entry_progress(&self) -> u8 {
        match self {
            DuelStatus::Pending => 0,
            DuelStatus::Scraping => 5,
            DuelStatus::Normalizing => 40,
            DuelStatus::Scoring => 55,
            DuelStatus::Transforming => 70,
            DuelStatus::GeneratingCommentary => 82,
            DuelStatus::Complete => 100,
            DuelStatus::Error => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DuelStatus::Pending => "pending",
            DuelStatus::Scraping => "scraping",
            DuelStatus::Normalizing => "normalizing",
            DuelStatus::Scoring => "scoring",
            DuelStatus::Transforming => "transforming",
            DuelStatus::GeneratingCommentary => "generating_commentary",
            DuelStatus::Complete => "complete",
            DuelStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for DuelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-run state machine with the visited path recorded
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Current stage
    pub stage: DuelStatus,
    history: Vec<DuelStatus>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stage: DuelStatus::Pending,
            history: vec![DuelStatus::Pending],
        }
    }
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage and return it
    pub fn advance(&mut self) -> DuelStatus {
        let next = self.stage.next();
        if next != self.stage {
            self.stage = next;
            self.history.push(next);
        }
        self.stage
    }

    /// Fail the pipeline
    pub fn fail(&mut self) {
        if self.stage != DuelStatus::Error {
            self.stage = DuelStatus::Error;
            self.history.push(DuelStatus::Error);
        }
    }

    /// Stages visited so far, in order
    pub fn history(&self) -> &[DuelStatus] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_advance() {
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.stage, DuelStatus::Pending);

        assert_eq!(pipeline.advance(), DuelStatus::Scraping);
        assert_eq!(pipeline.advance(), DuelStatus::Normalizing);
        assert!(!pipeline.stage.is_terminal());
    }

    #[test]
    fn test_happy_path_visits_every_stage_once() {
        let mut pipeline = Pipeline::new();
        while !pipeline.stage.is_terminal() {
            pipeline.advance();
        }
        assert_eq!(pipeline.stage, DuelStatus::Complete);
        assert_eq!(
            pipeline.history(),
            &[
                DuelStatus::Pending,
                DuelStatus::Scraping,
                DuelStatus::Normalizing,
                DuelStatus::Scoring,
                DuelStatus::Transforming,
                DuelStatus::GeneratingCommentary,
                DuelStatus::Complete,
            ]
        );
        // Terminal stages are sticky
        pipeline.advance();
        assert_eq!(pipeline.history().len(), 7);
    }

    #[test]
    fn test_fail_from_mid_pipeline() {
        let mut pipeline = Pipeline::new();
        pipeline.advance();
        pipeline.advance();
        pipeline.fail();
        pipeline.fail();
        assert_eq!(pipeline.advance(), DuelStatus::Error);
        assert_eq!(
            pipeline.history(),
            &[DuelStatus::Pending, DuelStatus::Scraping, DuelStatus::Normalizing, DuelStatus::Error]
        );
    }

    #[test]
    fn test_progress_maps() {
        assert_eq!(DuelStatus::GeneratingCommentary.progress(), 85);
        assert_eq!(DuelStatus::GeneratingCommentary.entry_progress(), 82);
        assert_eq!(DuelStatus::Error.progress(), 0);
        assert_eq!(
            serde_json::to_string(&DuelStatus::GeneratingCommentary).unwrap(),
            "\"generating_commentary\""
        );
    }
}
