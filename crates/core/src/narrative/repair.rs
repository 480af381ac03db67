//! Repair pass over model output.
//!
//! Whatever the model returns, a repaired commentary has exactly
//! [`ROUND_COUNT`] rounds numbered from 1, attackers alternating from the
//! first fighter, damage inside `[MIN_DAMAGE, MAX_DAMAGE]` and the scored
//! winner. Deviations are counted in a [`RepairReport`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{BattleCommentary, RoastRound};
use crate::error::NarrativeError;
use crate::scoring::{FighterSlot, Winner};

pub const ROUND_COUNT: usize = 6;
pub const DEFAULT_DAMAGE: u8 = 60;
pub const MIN_DAMAGE: u8 = 30;
pub const MAX_DAMAGE: u8 = 95;

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?\n?|\n?```").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct RawCommentary {
    #[serde(default, alias = "intro")]
    introduction: Option<Value>,
    #[serde(default)]
    rounds: Vec<RawRound>,
    #[serde(default)]
    verdict: Option<Value>,
    #[serde(default)]
    winner: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRound {
    #[serde(default, alias = "roundNumber")]
    round_number: Option<Value>,
    #[serde(default)]
    attacker: Option<Value>,
    #[serde(default)]
    roast: Option<Value>,
    #[serde(default)]
    damage: Option<Value>,
    #[serde(default)]
    reaction: Option<Value>,
}

/// What the repair pass had to change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Rounds dropped past [`ROUND_COUNT`]
    pub truncated: usize,
    pub renumbered: usize,
    /// Rounds whose inferred attacker differed from the alternation
    pub attackers_corrected: usize,
    /// Rounds whose attacker field named nobody recognizable
    pub attackers_unresolved: usize,
    pub damage_defaulted: usize,
    pub damage_clamped: usize,
    pub winner_overridden: bool,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse and repair a raw completion
pub fn repair(
    content: &str,
    name1: &str,
    name2: &str,
    winner: Winner,
) -> Result<(BattleCommentary, RepairReport), NarrativeError> {
    let raw = parse(content)?;
    let mut report = RepairReport::default();

    let introduction = raw
        .introduction
        .as_ref()
        .and_then(text)
        .ok_or_else(|| NarrativeError::Malformed("missing introduction".into()))?;
    let verdict = raw
        .verdict
        .as_ref()
        .and_then(text)
        .ok_or_else(|| NarrativeError::Malformed("missing verdict".into()))?;

    if raw.rounds.len() < ROUND_COUNT {
        return Err(NarrativeError::Malformed(format!(
            "expected {} rounds, got {}",
            ROUND_COUNT,
            raw.rounds.len()
        )));
    }
    report.truncated = raw.rounds.len() - ROUND_COUNT;

    let rounds: Vec<RoastRound> = raw
        .rounds
        .iter()
        .take(ROUND_COUNT)
        .enumerate()
        .map(|(idx, round)| repair_round(idx, round, name1, name2, &mut report))
        .collect();

    let claimed = raw
        .winner
        .and_then(|w| serde_json::from_value::<Winner>(w).ok());
    report.winner_overridden = claimed != Some(winner);

    Ok((
        BattleCommentary {
            introduction,
            rounds,
            verdict,
            winner,
        },
        report,
    ))
}

fn parse(content: &str) -> Result<RawCommentary, NarrativeError> {
    let stripped = FENCE.replace_all(content, "");
    let trimmed = stripped.trim();
    match serde_json::from_str(trimmed) {
        Ok(raw) => Ok(raw),
        Err(first) => {
            // prose around the object
            let object = trimmed
                .find('{')
                .zip(trimmed.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &trimmed[start..=end]);
            object
                .and_then(|o| serde_json::from_str(o).ok())
                .ok_or_else(|| NarrativeError::Malformed(format!("not JSON: {}", first)))
        }
    }
}

fn repair_round(
    idx: usize,
    round: &RawRound,
    name1: &str,
    name2: &str,
    report: &mut RepairReport,
) -> RoastRound {
    let round_number = (idx + 1) as u8;
    let expected = if idx % 2 == 0 {
        FighterSlot::First
    } else {
        FighterSlot::Second
    };

    if round.round_number.as_ref().and_then(number) != Some(round_number as f64) {
        report.renumbered += 1;
    }

    let claimed = round.attacker.as_ref().and_then(text).unwrap_or_default();
    match infer_attacker(&claimed, name1, name2) {
        Some(slot) if slot != expected => report.attackers_corrected += 1,
        Some(_) => {}
        None => report.attackers_unresolved += 1,
    }

    RoastRound {
        round_number,
        attacker: expected,
        roast: round.roast.as_ref().and_then(text).unwrap_or_default(),
        damage: repair_damage(round.damage.as_ref(), report),
        reaction: round.reaction.as_ref().and_then(text).unwrap_or_default(),
    }
}

/// Missing, zero or non-numeric damage becomes the default; then clamp
fn repair_damage(damage: Option<&Value>, report: &mut RepairReport) -> u8 {
    let value = match damage.and_then(number).filter(|d| d.is_finite() && *d != 0.0) {
        Some(d) => d,
        None => {
            report.damage_defaulted += 1;
            return DEFAULT_DAMAGE;
        }
    };
    let clamped = value.clamp(MIN_DAMAGE as f64, MAX_DAMAGE as f64);
    if clamped != value {
        report.damage_clamped += 1;
    }
    clamped.round() as u8
}

/// Which fighter a free-text attacker field refers to
pub fn infer_attacker(claimed: &str, name1: &str, name2: &str) -> Option<FighterSlot> {
    let value = claimed.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }
    match value.as_str() {
        "profile1" => return Some(FighterSlot::First),
        "profile2" => return Some(FighterSlot::Second),
        _ => {}
    }

    let mentions = |name: &str| {
        let name = name.trim().to_lowercase();
        !name.is_empty() && value.contains(&name)
    };
    let ordinal = |digit: &str, word: &str| value.contains(digit) || value.contains(word);

    if mentions(name1) || ordinal("1", "first") {
        Some(FighterSlot::First)
    } else if mentions(name2) || ordinal("2", "second") {
        Some(FighterSlot::Second)
    } else {
        None
    }
}

fn text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
