//! # DevDuel Core
//!
//! Everything behind a duel between two public profiles: acquisition,
//! normalization, scoring, the roast narrative and the orchestrating
//! state machine.
//!
//! ## Architecture
//!
//! - `acquisition/` - URL resolution, collaborator clients, synthetic fallback
//! - `profile/` - canonical profile and per-platform normalizers
//! - `scoring/` - battle stats, power, archetypes, winner decision
//! - `narrative/` - LLM roast battle with repair pass and fallback
//! - `duel/` - stage pipeline, ticker and the [`DuelCoordinator`](duel::DuelCoordinator)
//! - `state/` - session stores (memory, SQLite)
//! - `events` - progress broadcast
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use devduel_core::config::DuelConfig;
//! use devduel_core::duel::DuelCoordinator;
//! use devduel_core::events::BroadcastEventBus;
//!
//! let bus = Arc::new(BroadcastEventBus::default());
//! let coordinator = DuelCoordinator::from_config(&DuelConfig::from_env(), bus)?;
//! let result = coordinator
//!     .run_duel("https://github.com/octocat", "https://en.wikipedia.org/wiki/Grace_Hopper", None)
//!     .await?;
//! ```

pub mod acquisition;
pub mod config;
pub mod duel;
pub mod error;
pub mod events;
pub mod models;
pub mod narrative;
pub mod profile;
pub mod random;
pub mod scoring;
pub mod state;
