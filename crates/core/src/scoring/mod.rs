//! # Scoring
//!
//! Deterministic stat computation, power aggregation, archetype selection
//! and the winner decision. The only randomness is the generic technique
//! name, drawn from an injected [`RandomSource`](crate::random::RandomSource).

mod archetype;
mod engine;
mod stats;
pub mod tables;

use serde::{Deserialize, Serialize};

pub use archetype::Archetype;
pub use engine::{
    decide_winner, FighterRecord, Mission, MissionRank, ScoringEngine, ScoringWeights,
    DRAW_MARGIN,
};
pub use stats::{BattleStats, StatKind};

/// Which side of the duel a fighter stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterSlot {
    #[serde(rename = "profile1")]
    First,
    #[serde(rename = "profile2")]
    Second,
}

impl FighterSlot {
    /// 1 or 2
    pub fn number(&self) -> u8 {
        match self {
            FighterSlot::First => 1,
            FighterSlot::Second => 2,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            FighterSlot::First => FighterSlot::Second,
            FighterSlot::Second => FighterSlot::First,
        }
    }

    /// Wire tag, `profile1` or `profile2`
    pub fn tag(&self) -> &'static str {
        match self {
            FighterSlot::First => "profile1",
            FighterSlot::Second => "profile2",
        }
    }
}

impl std::fmt::Display for FighterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Duel outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "profile1")]
    First,
    #[serde(rename = "profile2")]
    Second,
    #[serde(rename = "draw")]
    Draw,
}

impl Winner {
    /// The same outcome with the fighters swapped
    pub fn flipped(&self) -> Self {
        match self {
            Winner::First => Winner::Second,
            Winner::Second => Winner::First,
            Winner::Draw => Winner::Draw,
        }
    }

    pub fn slot(&self) -> Option<FighterSlot> {
        match self {
            Winner::First => Some(FighterSlot::First),
            Winner::Second => Some(FighterSlot::Second),
            Winner::Draw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerDecision {
    pub winner: Winner,
    /// Absolute power difference
    pub margin: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_tags() {
        assert_eq!(serde_json::to_string(&FighterSlot::Second).unwrap(), "\"profile2\"");
        assert_eq!(serde_json::to_string(&Winner::Draw).unwrap(), "\"draw\"");
        assert_eq!(FighterSlot::First.other(), FighterSlot::Second);
        assert_eq!(Winner::First.slot(), Some(FighterSlot::First));
    }
}
