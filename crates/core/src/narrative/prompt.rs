//! Roast-battle prompt construction.

use std::fmt::Write;

use crate::scoring::FighterRecord;

pub const SYSTEM_PROMPT: &str = r#"You are an AI Roast Master organizing a savage rap-battle style professional roast.
Two professionals roast each other based on their public developer and career profiles.
Focus on:
- Cringe content (influencer wannabe, generic motivational posts)
- Job hopping or staying too long at boring companies
- Buzzword overuse ("Thought Leader", "Visionary")
- Tech stack shaming ("Oh, you're a 'Java Guru'? Enjoy your boilerplate.")
- Gap years or weird career pivots

CRITICAL RULES:
- Generate exactly 6 rounds.
- Rounds MUST strictly alternate: profile1, profile2, profile1, profile2, profile1, profile2.
- The "attacker" field MUST be the literal string "profile1" or "profile2", NEVER the person's actual name.
- Damage values range from 40 to 95. Vary them, not every hit is a crit.
- Each roast targets the OTHER person (the defender), not the attacker.

Return ONLY valid JSON matching this exact structure:
{
  "introduction": "Hype up the crowd for the battle (1-2 sentences)",
  "rounds": [
    { "roundNumber": 1, "attacker": "profile1", "roast": "profile1 roasts profile2", "damage": 70, "reaction": "profile2's reaction" },
    { "roundNumber": 2, "attacker": "profile2", "roast": "profile2 counter-roasts profile1", "damage": 65, "reaction": "profile1's reaction" },
    { "roundNumber": 3, "attacker": "profile1", "roast": "profile1 escalates", "damage": 80, "reaction": "profile2's reaction" },
    { "roundNumber": 4, "attacker": "profile2", "roast": "profile2 fires back harder", "damage": 85, "reaction": "profile1's reaction" },
    { "roundNumber": 5, "attacker": "profile1", "roast": "profile1 goes for the kill", "damage": 90, "reaction": "profile2's reaction" },
    { "roundNumber": 6, "attacker": "profile2", "roast": "profile2's final stand", "damage": 75, "reaction": "profile1's reaction" }
  ],
  "verdict": "Explanation of who won and why",
  "winner": "profile1" or "profile2" or "draw"
}"#;

const TOP_SKILLS: usize = 5;

/// User message describing both contenders
pub fn matchup(fighter1: &FighterRecord, fighter2: &FighterRecord) -> String {
    let mut out = String::from("ROAST BATTLE MATCHUP:\n");
    contender(&mut out, 1, fighter1, "No summary provided (boring?)");
    contender(&mut out, 2, fighter2, "No summary provided (mysterious or lazy?)");
    out.push_str(
        "\nGenerate a 6-round roast battle (alternating profile1 → profile2 → profile1 → profile2 → profile1 → profile2) \
         where they tear each other apart based on these facts. Be savage but funny. \
         Remember: \"attacker\" must be exactly \"profile1\" or \"profile2\".",
    );
    out
}

fn contender(out: &mut String, number: u8, fighter: &FighterRecord, no_summary: &str) {
    let p = &fighter.profile;
    let s = &fighter.stats;
    let skills = fighter.top_skills(TOP_SKILLS);
    let summary = if p.summary.trim().is_empty() {
        no_summary
    } else {
        p.summary.as_str()
    };

    // writeln! into a String cannot fail
    let _ = writeln!(out, "\nCONTENDER {}: {}", number, p.name);
    let _ = writeln!(out, "- Title: {}", p.title);
    let _ = writeln!(out, "- Archetype: {}", fighter.archetype.label());
    let _ = writeln!(out, "- Power: {}", fighter.power);
    let _ = writeln!(
        out,
        "- Top skills: {}",
        if skills.is_empty() { "none listed".to_string() } else { skills.join(", ") }
    );
    let _ = writeln!(out, "- Guild: {}", fighter.guild);
    let _ = writeln!(
        out,
        "- Experience: {} ({} years)",
        fighter.battle_experience, p.years_experience
    );
    let _ = writeln!(out, "- Special ability: {}", fighter.special_ability);
    let _ = writeln!(
        out,
        "- Stats: technical {}, strategy {}, execution {}, leadership {}, impact {}, experience {}",
        s.technical, s.strategy, s.execution, s.leadership, s.impact, s.experience
    );
    let _ = writeln!(out, "- Bio/Summary: {}", summary);
}
