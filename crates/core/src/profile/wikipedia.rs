//! Encyclopedia mapping (REST summary, parsed infobox, DOM capture).

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize::{push_unique, value_text, Fields, MAX_SKILLS};
use super::{CanonicalProfile, Company, Education};
use crate::acquisition::JsonObject;

const MAX_ACHIEVEMENTS: usize = 10;
const SUMMARY_CHARS: usize = 500;
/// Assumed age at career start
const CAREER_START_AGE: i32 = 22;

const NATIONALITIES: &[&str] = &[
    "American", "British", "Canadian", "Indian", "Chinese", "French", "German", "Japanese",
    "South African", "Australian", "Israeli", "Korean", "Brazilian", "Russian", "Italian",
    "Spanish", "Dutch", "Swedish", "Norwegian", "Swiss", "Irish", "Scottish", "New Zealand",
    "Taiwanese", "Singaporean", "Malaysian", "Indonesian",
];

const LEADERSHIP_TERMS: &[&str] = &[
    "founder", "ceo", "president", "chairman", "director", "chief", "inventor", "creator",
    "pioneer",
];

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("valid regex"));

static INTRO_ROLES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)(?:CEO|chief executive officer) of (\w[\w\s]*)", "CEO"),
        (r"(?i)(?:co-?founder|founder) of (\w[\w\s]*)", "Founder"),
        (r"(?i)(?:chairman|chair) of (\w[\w\s]*)", "Chairman"),
        (r"(?i)president of (\w[\w\s]*)", "President"),
        (r"(?i)(?:CTO|chief technology officer) of (\w[\w\s]*)", "CTO"),
    ]
    .into_iter()
    .map(|(pattern, role)| (Regex::new(pattern).expect("valid regex"), role))
    .collect()
});

/// Infobox lookup tolerant of key spelling
struct Infobox<'a>(Option<&'a JsonObject>);

impl Infobox<'_> {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.0?;
        let lower = key.to_lowercase();
        let spaced = lower.replace('_', " ");
        let variants = [
            key.to_string(),
            lower.replace(' ', "_"),
            capitalize(&spaced),
            spaced,
        ];
        variants
            .iter()
            .filter_map(|k| map.get(k))
            .find_map(value_text)
    }

    fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.get(k))
    }
}

pub(super) fn map(f: &Fields<'_>, current_year: i32) -> CanonicalProfile {
    let infobox = Infobox(f.object("infobox"));
    let intro = f.text(&["intro", "first_paragraph"]).unwrap_or_default();
    let description = f.text(&["description"]).unwrap_or_default();

    let occupation = infobox
        .first(&["occupation", "title"])
        .or_else(|| f.text(&["occupation"]))
        .unwrap_or_default();
    let known_for = infobox.get("known_for").unwrap_or_default();
    let awards = infobox
        .first(&["awards", "honors", "honours"])
        .or_else(|| f.text(&["awards"]))
        .unwrap_or_default();

    let title = display_title(&occupation, &description);

    let location = infobox
        .first(&["nationality", "citizenship", "birth_place"])
        .or_else(|| f.text(&["nationality"]))
        .or_else(|| nationality_in(&description))
        .or_else(|| nationality_in(&intro))
        .unwrap_or_default();

    let mut skills: Vec<String> = Vec::new();
    for item in split_items(&occupation, &[',', ';', '&', '\n'])
        .chain(split_items(&known_for, &[',', ';', '&', '\n']))
        .filter(|s| (2..80).contains(&s.chars().count()))
    {
        push_unique(&mut skills, item);
    }
    skills.truncate(MAX_SKILLS);

    let achievements = split_items(&awards, &[',', ';', '\n'])
        .filter(|a| a.chars().count() > 2)
        .take(MAX_ACHIEVEMENTS)
        .collect();

    let born = infobox
        .first(&["born", "birth_date"])
        .or_else(|| f.text(&["born"]))
        .unwrap_or_default();

    CanonicalProfile {
        name: f
            .text(&["title", "name"])
            .map(|n| n.trim_end_matches(" - Wikipedia").to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        avatar: f
            .text(&["image", "thumbnail"])
            .or_else(|| infobox.get("image"))
            .unwrap_or_default(),
        location,
        skills,
        years_experience: years_active(&born, &intro, current_year),
        leadership_roles: leadership_roles(&intro, &occupation),
        achievements,
        companies: companies(&infobox, &intro, &title),
        education: infobox
            .first(&["alma_mater", "education"])
            .map(|e| {
                split_items(&e, &[',', ';', '&', '\n'])
                    .map(|institution| Education {
                        institution,
                        ..Default::default()
                    })
                    .collect()
            })
            .unwrap_or_default(),
        summary: intro.chars().take(SUMMARY_CHARS).collect(),
        title,
        ..Default::default()
    }
}

fn split_items<'a>(text: &'a str, separators: &'a [char]) -> impl Iterator<Item = String> + 'a {
    text.split(move |c| separators.contains(&c))
        .map(str::trim)
        .filter(|s| s.chars().count() > 1)
        .map(str::to_string)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    text.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}

fn display_title(occupation: &str, description: &str) -> String {
    if let Some(first) = split_items(occupation, &[',', '\n']).next() {
        return title_case(&first);
    }
    if description.is_empty() {
        "Notable Figure".to_string()
    } else {
        capitalize(description)
    }
}

fn nationality_in(text: &str) -> Option<String> {
    NATIONALITIES
        .iter()
        .find(|n| text.contains(*n))
        .map(|n| n.to_string())
}

/// Years since birth + 22 when a birth year is known, else a keyword guess
fn years_active(born: &str, intro: &str, current_year: i32) -> u32 {
    let birth_year = YEAR
        .find_iter(born)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .find(|y| (1800..=2100).contains(y));

    if let Some(birth) = birth_year {
        return (current_year - (birth + CAREER_START_AGE)).max(1) as u32;
    }

    let lower = intro.to_lowercase();
    if lower.contains("veteran") || lower.contains("pioneer") {
        25
    } else if lower.contains("senior") || lower.contains("experienced") {
        15
    } else {
        10
    }
}

fn leadership_roles(intro: &str, occupation: &str) -> Vec<String> {
    let combined = format!("{} {}", intro, occupation).to_lowercase();
    LEADERSHIP_TERMS
        .iter()
        .filter(|k| combined.contains(*k))
        .map(|k| capitalize(k))
        .collect()
}

fn companies(infobox: &Infobox<'_>, intro: &str, role: &str) -> Vec<Company> {
    let mut companies: Vec<Company> = Vec::new();
    let current = |name: String, role: &str| Company {
        name,
        role: role.to_string(),
        duration: None,
        current: true,
    };

    match infobox.first(&["employer", "organization", "company"]) {
        Some(employer) => companies.extend(
            split_items(&employer, &[',', ';', '&', '\n']).map(|name| current(name, role)),
        ),
        None => {
            if let Some(titles) = infobox.get("title") {
                companies
                    .extend(split_items(&titles, &[',', ';', '\n']).map(|name| current(name, role)));
            }
        }
    }

    for (pattern, intro_role) in INTRO_ROLES.iter() {
        for captures in pattern.captures_iter(intro) {
            let Some(m) = captures.get(1) else { continue };
            let name = m
                .as_str()
                .trim()
                .trim_end_matches(['.', ',', ';'])
                .trim()
                .to_string();
            let seen = companies
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&name));
            if !name.is_empty() && name.chars().count() < 50 && !seen {
                companies.push(current(name, *intro_role));
            }
        }
    }
    companies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{Platform, RawAcquisition};
    use crate::profile::normalize_at;
    use serde_json::{json, Value};

    fn normalize_payload(payload: Value) -> CanonicalProfile {
        let map = payload.as_object().cloned().unwrap_or_default();
        normalize_at(
            &RawAcquisition::new(
                Platform::Wikipedia,
                "https://en.wikipedia.org/wiki/Grace_Hopper",
                map,
            ),
            2026,
        )
    }

    #[test]
    fn test_infobox_driven_profile() {
        let profile = normalize_payload(json!({
            "title": "Grace Hopper",
            "description": "American computer scientist (1906-1992)",
            "intro": "Grace Brewster Hopper was an American computer scientist and United States Navy rear admiral. A pioneer of computer programming, she was the first to devise the theory of machine-independent programming languages.",
            "image": "https://upload.wikimedia.org/hopper.jpg",
            "infobox": {
                "birth_date": "1906-12-9",
                "occupation": "computer scientist, Navy officer",
                "known_for": "COBOL & FLOW-MATIC",
                "awards": "Defense Distinguished Service Medal, National Medal of Technology",
                "alma_mater": "Vassar College, Yale University"
            }
        }));

        assert_eq!(profile.name, "Grace Hopper");
        assert_eq!(profile.title, "Computer Scientist");
        assert_eq!(profile.location, "American");
        assert_eq!(
            profile.skills,
            vec!["computer scientist", "Navy officer", "COBOL", "FLOW-MATIC"]
        );
        // 2026 - (1906 + 22)
        assert_eq!(profile.years_experience, 98);
        assert_eq!(profile.achievements.len(), 2);
        assert_eq!(profile.education[1].institution, "Yale University");
        assert_eq!(profile.leadership_roles, vec!["Pioneer"]);
        assert_eq!(profile.avatar, "https://upload.wikimedia.org/hopper.jpg");
        assert_eq!(profile.source_type, Platform::Wikipedia);
    }

    #[test]
    fn test_intro_companies_and_heuristics() {
        let profile = normalize_payload(json!({
            "name": "Jo Founder - Wikipedia",
            "first_paragraph": "Jo is a senior entrepreneur, the founder of Widgetworks. Jo also served as CEO of Widgetworks, and chairman of Gizmo Labs.",
            "infobox": { "Employer": "Acme Corp" }
        }));

        assert_eq!(profile.name, "Jo Founder");
        assert_eq!(profile.title, "Notable Figure");
        assert_eq!(profile.years_experience, 15);
        let names: Vec<_> = profile.companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Acme Corp", "Widgetworks", "Gizmo Labs"]);
        assert_eq!(profile.companies[1].role, "CEO");
        assert_eq!(
            profile.leadership_roles,
            vec!["Founder", "Ceo", "Chairman"]
        );
    }

    #[test]
    fn test_description_fallback_title() {
        let profile = normalize_payload(json!({
            "title": "Someone",
            "description": "dutch sculptor"
        }));
        assert_eq!(profile.title, "Dutch sculptor");
        assert_eq!(profile.years_experience, 10);
        assert_eq!(profile.location, "");
    }
}
