//! # Duel Orchestration
//!
//! - [`DuelStatus`] / [`Pipeline`] - the stage state machine
//! - [`CommentaryTicker`] - flavor progress while the narrative is pending
//! - [`DuelCoordinator`] - runs a duel end to end

mod coordinator;
mod pipeline;
mod ticker;

pub use coordinator::{DuelCoordinator, DuelResult, DuelStatusReport};
pub use pipeline::{DuelStatus, Pipeline};
pub use ticker::{CommentaryTicker, TICKER_CEILING, TICKER_START};
