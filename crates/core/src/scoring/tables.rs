//! Static lookup data for scoring and flavor text.
//!
//! Table order matters: partial skill matching returns the first entry
//! whose key contains (or is contained in) the skill.

/// Skill → tier points
pub const SKILL_TIERS: &[(&str, u32)] = &[
    // S
    ("kubernetes", 10),
    ("machine learning", 10),
    ("deep learning", 10),
    ("rust", 10),
    ("system design", 10),
    ("distributed systems", 10),
    ("blockchain", 10),
    ("ai", 10),
    ("mlops", 10),
    ("data engineering", 10),
    ("cloud architecture", 10),
    // A
    ("typescript", 8),
    ("go", 8),
    ("scala", 8),
    ("python", 8),
    ("java", 8),
    ("react", 8),
    ("aws", 8),
    ("gcp", 8),
    ("azure", 8),
    ("docker", 8),
    ("postgresql", 8),
    ("mongodb", 8),
    ("graphql", 8),
    ("microservices", 8),
    // B
    ("javascript", 6),
    ("node.js", 6),
    ("ruby", 6),
    ("php", 6),
    ("c#", 6),
    ("vue", 6),
    ("angular", 6),
    ("mysql", 6),
    ("redis", 6),
    ("elasticsearch", 6),
    ("jenkins", 6),
    ("terraform", 6),
    ("kafka", 6),
    // C
    ("html", 4),
    ("css", 4),
    ("sql", 4),
    ("git", 4),
    ("linux", 4),
    ("rest api", 4),
    ("agile", 4),
    ("scrum", 4),
    ("jira", 4),
    // D
    ("excel", 2),
    ("word", 2),
    ("powerpoint", 2),
    ("communication", 2),
];

/// Tier for skills matching nothing in [`SKILL_TIERS`]
pub const DEFAULT_SKILL_TIER: u32 = 3;

/// Highest tier a single skill can earn
pub const MAX_SKILL_TIER: u32 = 10;

/// Skill → fixed technique name
pub const TECHNIQUE_NAMES: &[(&str, &str)] = &[
    ("javascript", "Thunder Script Jutsu"),
    ("typescript", "Type Guardian Shield"),
    ("python", "Serpent Code Strike"),
    ("java", "Ancient Coffee Technique"),
    ("react", "Component Manifestation"),
    ("vue", "Progressive Binding Art"),
    ("angular", "Framework Fortress"),
    ("node.js", "Server Spirit Summoning"),
    ("aws", "Cloud Domain Expansion"),
    ("docker", "Container Dimension"),
    ("kubernetes", "Orchestration Infinity"),
    ("machine learning", "Neural Network Enlightenment"),
    ("ai", "Artificial Intelligence Awakening"),
    ("rust", "Memory Safe Armor"),
    ("go", "Goroutine Flash Step"),
    ("postgresql", "Relational Memory Palace"),
    ("mongodb", "Document Chaos Control"),
    ("graphql", "Query Manipulation Art"),
    ("git", "Version Control Time Travel"),
    ("linux", "Penguin Spirit Form"),
];

pub const TECHNIQUE_PREFIXES: &[&str] =
    &["Ultimate", "Divine", "Ancient", "Forbidden", "Sacred", "Mystic"];

pub const TECHNIQUE_SUFFIXES: &[&str] = &["Strike", "Art", "Technique", "Jutsu", "Style", "Form"];

/// Any of these in a role marks it as a leadership role
pub const LEADERSHIP_KEYWORDS: &[&str] = &[
    "lead", "manager", "director", "head", "chief", "vp", "president", "founder", "cto", "ceo",
    "coo", "principal", "staff", "architect",
];

pub const EXECUTIVE_KEYWORDS: &[&str] = &["ceo", "cto", "coo", "chief", "president", "founder"];
pub const DIRECTOR_KEYWORDS: &[&str] = &["director", "vp", "head"];
pub const LEAD_KEYWORDS: &[&str] = &["lead", "manager", "principal", "staff"];

/// Employers that earn the one-time prestige bonus
pub const PRESTIGE_COMPANIES: &[&str] = &[
    "google", "meta", "facebook", "amazon", "apple", "microsoft", "netflix", "tesla", "openai",
    "anthropic", "stripe", "airbnb", "uber", "coinbase", "databricks",
];

/// Tier points for a skill: exact match, then partial match, then the default
pub fn skill_tier(skill: &str) -> u32 {
    let skill = skill.trim().to_lowercase();
    if skill.is_empty() {
        return DEFAULT_SKILL_TIER;
    }
    if let Some((_, tier)) = SKILL_TIERS.iter().find(|(key, _)| *key == skill) {
        return *tier;
    }
    SKILL_TIERS
        .iter()
        .find(|(key, _)| skill.contains(key) || key.contains(skill.as_str()))
        .map(|(_, tier)| *tier)
        .unwrap_or(DEFAULT_SKILL_TIER)
}

/// Fixed technique name for a skill, if it has one
pub fn technique_for(skill: &str) -> Option<&'static str> {
    let skill = skill.trim().to_lowercase();
    TECHNIQUE_NAMES
        .iter()
        .find(|(key, _)| *key == skill)
        .map(|(_, name)| *name)
}

/// Whether `text` (any case) contains one of `keywords`
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}
