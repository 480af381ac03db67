//! Archetype classification.

use serde::{Deserialize, Serialize};

use super::stats::{BattleStats, StatKind};

/// Fighter archetype derived from the stat shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    #[serde(rename = "The Strategist")]
    Strategist,
    #[serde(rename = "The Executor")]
    Executor,
    #[serde(rename = "The Visionary")]
    Visionary,
    #[serde(rename = "The Warrior")]
    Warrior,
    #[serde(rename = "The Prodigy")]
    Prodigy,
    #[serde(rename = "The Veteran")]
    Veteran,
    #[serde(rename = "The Shadow")]
    Shadow,
    #[serde(rename = "The Commander")]
    Commander,
}

/// Below this spread a fighter counts as balanced
const BALANCED_SPREAD: f64 = 10.0;

impl Archetype {
    /// Pick the archetype for a set of stats. Balanced stats win first,
    /// then the rules below in order.
    pub fn classify(stats: &BattleStats) -> Self {
        if stats.spread() < BALANCED_SPREAD {
            return Archetype::Warrior;
        }

        let top = stats
            .ranked()
            .first()
            .map(|(kind, _)| *kind)
            .unwrap_or(StatKind::Technical);
        let BattleStats {
            strategy,
            leadership,
            impact,
            experience,
            ..
        } = *stats;

        if leadership >= 70 {
            Archetype::Commander
        } else if top == StatKind::Technical && experience < 50 {
            Archetype::Prodigy
        } else if top == StatKind::Technical && leadership < 30 && impact < 40 {
            Archetype::Shadow
        } else if top == StatKind::Experience && leadership >= 50 {
            Archetype::Veteran
        } else if top == StatKind::Impact && strategy >= 60 {
            Archetype::Visionary
        } else if top == StatKind::Strategy && leadership >= 50 {
            Archetype::Strategist
        } else if matches!(top, StatKind::Execution | StatKind::Technical) {
            Archetype::Executor
        } else {
            Archetype::Warrior
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Archetype::Strategist => "The Strategist",
            Archetype::Executor => "The Executor",
            Archetype::Visionary => "The Visionary",
            Archetype::Warrior => "The Warrior",
            Archetype::Prodigy => "The Prodigy",
            Archetype::Veteran => "The Veteran",
            Archetype::Shadow => "The Shadow",
            Archetype::Commander => "The Commander",
        }
    }

    /// Signature ability line built around the fighter's top skill
    pub fn special_ability(&self, top_skill: &str) -> String {
        match self {
            Archetype::Strategist => format!(
                "Strategic {} Mastery - Can see through any technical challenge",
                top_skill
            ),
            Archetype::Executor => format!(
                "Rapid {} Deployment - Executes with lightning speed",
                top_skill
            ),
            Archetype::Visionary => format!(
                "{} Innovation - Creates solutions others can't imagine",
                top_skill
            ),
            Archetype::Warrior => format!(
                "Balanced {} Combat - Adapts to any battle situation",
                top_skill
            ),
            Archetype::Prodigy => format!(
                "Innate {} Genius - Natural talent beyond years",
                top_skill
            ),
            Archetype::Veteran => format!(
                "Ancient {} Wisdom - Experience that never fails",
                top_skill
            ),
            Archetype::Shadow => format!(
                "Hidden {} Power - True strength revealed in critical moments",
                top_skill
            ),
            Archetype::Commander => format!(
                "{} Leadership Aura - Inspires and leads armies of developers",
                top_skill
            ),
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(t: u32, s: u32, e: u32, l: u32, i: u32, x: u32) -> BattleStats {
        BattleStats {
            technical: t,
            strategy: s,
            execution: e,
            leadership: l,
            impact: i,
            experience: x,
        }
    }

    #[test]
    fn test_balanced_is_warrior() {
        assert_eq!(
            Archetype::classify(&stats(50, 55, 45, 50, 52, 48)),
            Archetype::Warrior
        );
        // 24/0/0/0/0/15 has a spread of about 8.67
        assert_eq!(
            Archetype::classify(&stats(24, 0, 0, 0, 0, 15)),
            Archetype::Warrior
        );
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            Archetype::classify(&stats(90, 10, 10, 75, 10, 90)),
            Archetype::Commander
        );
        assert_eq!(
            Archetype::classify(&stats(90, 10, 10, 10, 10, 25)),
            Archetype::Prodigy
        );
        assert_eq!(
            Archetype::classify(&stats(90, 10, 10, 10, 10, 80)),
            Archetype::Shadow
        );
        assert_eq!(
            Archetype::classify(&stats(40, 20, 20, 55, 20, 90)),
            Archetype::Veteran
        );
        assert_eq!(
            Archetype::classify(&stats(30, 65, 20, 10, 90, 60)),
            Archetype::Visionary
        );
        assert_eq!(
            Archetype::classify(&stats(30, 90, 20, 55, 20, 60)),
            Archetype::Strategist
        );
        assert_eq!(
            Archetype::classify(&stats(90, 10, 10, 40, 50, 80)),
            Archetype::Executor
        );
        assert_eq!(
            Archetype::classify(&stats(20, 20, 10, 10, 90, 20)),
            Archetype::Warrior
        );
    }

    #[test]
    fn test_serialized_label() {
        assert_eq!(
            serde_json::to_string(&Archetype::Shadow).unwrap(),
            "\"The Shadow\""
        );
        assert!(Archetype::Commander
            .special_ability("Rust")
            .starts_with("Rust Leadership Aura"));
    }
}
