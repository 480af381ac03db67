//! # Scoring Engine
//!
//! Turns a canonical profile into a fighter: stats, power, archetype and
//! the flavor fields the narrative and the UI render.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::archetype::Archetype;
use super::stats::BattleStats;
use super::tables::{technique_for, TECHNIQUE_PREFIXES, TECHNIQUE_SUFFIXES};
use super::{Winner, WinnerDecision};
use crate::profile::{CanonicalProfile, Company, Project};
use crate::random::{RandomSource, ThreadRandom};

/// Powers closer than this (inclusive) are a draw
pub const DRAW_MARGIN: u32 = 5;

const MAX_TECHNIQUES: usize = 6;
const MAX_MISSIONS: usize = 5;

/// Power weights. Strategy carries a fixed 0.20 that is not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills_depth: f64,
    pub experience: f64,
    pub impact: f64,
    pub leadership: f64,
    pub activity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills_depth: 0.30,
            experience: 0.20,
            impact: 0.25,
            leadership: 0.15,
            activity: 0.10,
        }
    }
}

const STRATEGY_WEIGHT: f64 = 0.20;

/// Mission difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionRank {
    S,
    A,
    B,
    C,
    D,
}

impl MissionRank {
    fn for_project(project: &Project) -> Self {
        match project.stars + project.forks * 2 {
            s if s > 1000 => MissionRank::S,
            s if s > 500 => MissionRank::A,
            s if s > 100 => MissionRank::B,
            s if s > 10 => MissionRank::C,
            _ => MissionRank::D,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub name: String,
    pub rank: MissionRank,
    pub description: String,
}

/// A scored fighter, ready for the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterRecord {
    pub profile: CanonicalProfile,
    pub stats: BattleStats,
    pub power: u32,
    pub archetype: Archetype,
    pub techniques: Vec<String>,
    pub guild: String,
    pub guild_history: Vec<String>,
    pub battle_experience: String,
    pub scrolls: Vec<String>,
    pub missions: Vec<Mission>,
    pub special_ability: String,
}

impl FighterRecord {
    /// Skills shown in narrative prompts
    pub fn top_skills(&self, n: usize) -> Vec<&str> {
        self.profile.skills.iter().take(n).map(|s| s.as_str()).collect()
    }
}

/// Deterministic scoring plus injectable randomness for technique names
#[derive(Clone)]
pub struct ScoringEngine {
    weights: ScoringWeights,
    random: Arc<dyn RandomSource>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringWeights::default(), Arc::new(ThreadRandom))
    }
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights, random: Arc<dyn RandomSource>) -> Self {
        Self { weights, random }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, profile: &CanonicalProfile) -> BattleStats {
        BattleStats::from_profile(profile)
    }

    /// Weighted power, rounded
    pub fn aggregate(&self, stats: &BattleStats) -> u32 {
        let w = &self.weights;
        let power = stats.technical as f64 * w.skills_depth
            + stats.strategy as f64 * STRATEGY_WEIGHT
            + stats.execution as f64 * w.activity
            + stats.leadership as f64 * w.leadership
            + stats.impact as f64 * w.impact
            + stats.experience as f64 * w.experience;
        power.round().max(0.0) as u32
    }

    pub fn classify(&self, stats: &BattleStats) -> Archetype {
        Archetype::classify(stats)
    }

    /// Compare two powers
    pub fn decide_winner(&self, power1: u32, power2: u32) -> WinnerDecision {
        decide_winner(power1, power2)
    }

    /// Build the full fighter record
    pub fn transform(&self, profile: CanonicalProfile, stats: BattleStats) -> FighterRecord {
        let archetype = self.classify(&stats);
        let power = self.aggregate(&stats);
        let top_skill = profile
            .skills
            .first()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .unwrap_or("coding");
        let special_ability = archetype.special_ability(top_skill);

        FighterRecord {
            techniques: self.techniques(&profile.skills),
            guild: guild(&profile.companies),
            guild_history: profile.companies.iter().map(|c| c.name.clone()).collect(),
            battle_experience: battle_experience(profile.years_experience).to_string(),
            scrolls: profile.certifications.clone(),
            missions: missions(&profile.projects),
            special_ability,
            stats,
            power,
            archetype,
            profile,
        }
    }

    fn techniques(&self, skills: &[String]) -> Vec<String> {
        skills
            .iter()
            .take(MAX_TECHNIQUES)
            .map(|skill| match technique_for(skill) {
                Some(name) => name.to_string(),
                None => {
                    let prefix = TECHNIQUE_PREFIXES[self.random.pick(TECHNIQUE_PREFIXES.len())];
                    let suffix = TECHNIQUE_SUFFIXES[self.random.pick(TECHNIQUE_SUFFIXES.len())];
                    format!("{} {} {}", prefix, skill, suffix)
                }
            })
            .collect()
    }
}

/// Margin is the absolute power difference; within [`DRAW_MARGIN`] is a draw
pub fn decide_winner(power1: u32, power2: u32) -> WinnerDecision {
    let margin = power1.abs_diff(power2);
    let winner = if margin <= DRAW_MARGIN {
        Winner::Draw
    } else if power1 > power2 {
        Winner::First
    } else {
        Winner::Second
    };
    WinnerDecision { winner, margin }
}

fn guild(companies: &[Company]) -> String {
    companies
        .iter()
        .find(|c| c.current)
        .or_else(|| companies.first())
        .map(|c| format!("{} Guild", c.name))
        .unwrap_or_else(|| "Independent Fighter".to_string())
}

fn battle_experience(years: u32) -> &'static str {
    match years {
        y if y >= 20 => "Legendary Veteran (20+ years of battle)",
        y if y >= 15 => "Master Warrior (15+ years of battle)",
        y if y >= 10 => "Elite Fighter (10+ years of battle)",
        y if y >= 7 => "Seasoned Warrior (7+ years of battle)",
        y if y >= 5 => "Experienced Fighter (5+ years of battle)",
        y if y >= 3 => "Rising Warrior (3+ years of battle)",
        y if y >= 1 => "Young Fighter (1+ years of battle)",
        _ => "Newcomer (Beginning their journey)",
    }
}

fn missions(projects: &[Project]) -> Vec<Mission> {
    projects
        .iter()
        .take(MAX_MISSIONS)
        .map(|p| Mission {
            name: p.name.clone(),
            rank: MissionRank::for_project(p),
            description: if p.description.is_empty() {
                "A mysterious mission".to_string()
            } else {
                p.description.clone()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(ScoringWeights::default(), Arc::new(SequenceRandom::new(vec![0, 3])))
    }

    #[test]
    fn test_aggregate_weights() {
        let stats = BattleStats {
            technical: 100,
            strategy: 100,
            execution: 100,
            leadership: 100,
            impact: 100,
            experience: 100,
        };
        // Weights sum to 1.20 with the fixed strategy term
        assert_eq!(engine().aggregate(&stats), 120);
        assert_eq!(engine().aggregate(&BattleStats::default()), 0);
    }

    #[test]
    fn test_decide_winner_margins() {
        let draw = decide_winner(80, 84);
        assert_eq!(draw.winner, Winner::Draw);
        assert_eq!(draw.margin, 4);

        let edge = decide_winner(80, 85);
        assert_eq!(edge.winner, Winner::Draw);

        let second = decide_winner(80, 90);
        assert_eq!(second.winner, Winner::Second);
        assert_eq!(second.margin, 10);
    }

    #[test]
    fn test_decide_winner_is_symmetric() {
        for (a, b) in [(10, 40), (77, 71), (50, 50), (3, 99)] {
            let forward = decide_winner(a, b);
            let reverse = decide_winner(b, a);
            assert_eq!(forward.margin, reverse.margin);
            assert_eq!(forward.winner, reverse.winner.flipped());
        }
    }

    #[test]
    fn test_transform_flavor_fields() {
        let profile = CanonicalProfile {
            name: "Ada".into(),
            skills: vec!["Rust".into(), "Juggling".into()],
            years_experience: 8,
            certifications: vec!["CKA".into()],
            companies: vec![
                Company {
                    name: "Old Co".into(),
                    role: "Engineer".into(),
                    ..Default::default()
                },
                Company {
                    name: "Now Inc".into(),
                    role: "Staff Engineer".into(),
                    current: true,
                    ..Default::default()
                },
            ],
            projects: vec![
                Project {
                    name: "big".into(),
                    stars: 900,
                    forks: 80,
                    ..Default::default()
                },
                Project {
                    name: "small".into(),
                    description: "tiny tool".into(),
                    stars: 3,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let engine = engine();
        let stats = engine.score(&profile);
        let fighter = engine.transform(profile, stats);

        assert_eq!(
            fighter.techniques,
            vec!["Memory Safe Armor", "Ultimate Juggling Jutsu"]
        );
        assert_eq!(fighter.guild, "Now Inc Guild");
        assert_eq!(fighter.guild_history, vec!["Old Co", "Now Inc"]);
        assert_eq!(
            fighter.battle_experience,
            "Seasoned Warrior (7+ years of battle)"
        );
        assert_eq!(fighter.scrolls, vec!["CKA"]);
        assert_eq!(fighter.missions[0].rank, MissionRank::S);
        assert_eq!(fighter.missions[0].description, "A mysterious mission");
        assert_eq!(fighter.missions[1].rank, MissionRank::D);
        assert!(fighter.special_ability.contains("Rust"));
        assert_eq!(fighter.power, engine.aggregate(&fighter.stats));
    }

    #[test]
    fn test_unknown_skills_score_as_warrior() {
        let skills = [
            "Juggling",
            "Knitting",
            "Pottery",
            "Fencing",
            "Sculpture",
            "Origami",
            "Birdwatching",
            "Skydiving",
        ];
        let profile = CanonicalProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let engine = engine();
        let stats = engine.score(&profile);
        assert_eq!(stats.technical, 24);
        assert_eq!(stats.experience, 15);
        assert_eq!(stats.leadership, 0);

        let fighter = engine.transform(profile, stats);
        assert_eq!(fighter.archetype, Archetype::Warrior);
        assert_eq!(fighter.techniques.len(), 6);
        assert!(fighter.special_ability.starts_with("Balanced Juggling Combat"));
    }

    #[test]
    fn test_empty_profile_defaults() {
        let engine = engine();
        let profile = CanonicalProfile::default();
        let stats = engine.score(&profile);
        let fighter = engine.transform(profile, stats);
        assert_eq!(fighter.guild, "Independent Fighter");
        assert!(fighter.techniques.is_empty());
        assert!(fighter.special_ability.contains("coding"));
        assert_eq!(fighter.battle_experience, "Newcomer (Beginning their journey)");
    }
}
