//! Networking-profile mapping (Bright Data LinkedIn dataset records).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::normalize::{item_text, value_number, value_text, Fields};
use super::{ActivityMetrics, CanonicalProfile, Company, Education};

static YEARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(year|yr)").expect("valid regex"));
static MONTHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(month|mo)").expect("valid regex"));

const LEADERSHIP_TERMS: &[&str] = &[
    "lead", "manager", "director", "head", "chief", "vp", "president", "founder", "cto", "ceo",
    "coo",
];

pub(super) fn map(f: &Fields<'_>) -> CanonicalProfile {
    let experiences = f.array("experience");
    let certs = f.array("certifications");
    let position = f.text(&["position"]);
    let current_company = f.text(&["current_company_name"]).or_else(|| {
        f.object("current_company")
            .and_then(|c| c.get("name"))
            .and_then(value_text)
    });

    let title = match (&position, &current_company) {
        (Some(p), _) => p.clone(),
        (None, Some(c)) => format!("Professional at {}", c),
        (None, None) => "Professional".to_string(),
    };

    let mut companies = Vec::new();
    if let Some(name) = &current_company {
        companies.push(Company {
            name: name.clone(),
            role: position.clone().unwrap_or_else(|| "Professional".to_string()),
            duration: None,
            current: true,
        });
    }
    companies.extend(experiences.iter().map(company_from_experience));

    let cert_titles: Vec<String> = certs
        .iter()
        .filter_map(|c| item_text(c, &["title"]))
        .collect();
    let language_titles = f
        .array("languages")
        .iter()
        .filter_map(|l| item_text(l, &["title"]));

    let years_experience = if !experiences.is_empty() {
        experience_years(experiences)
    } else if !certs.is_empty() || !f.array("organizations").is_empty() || !companies.is_empty() {
        3
    } else {
        0
    };

    CanonicalProfile {
        name: display_name(f),
        title,
        avatar: f
            .text(&["avatar", "profile_pic_url", "profile_picture"])
            .unwrap_or_default(),
        location: f.text(&["city", "location"]).unwrap_or_default(),
        skills: cert_titles.iter().cloned().chain(language_titles).collect(),
        years_experience,
        leadership_roles: leadership_roles(experiences),
        achievements: cert_titles,
        metrics: ActivityMetrics {
            connections: f.number(&["connections"]),
            followers: f.number(&["followers"]),
            posts: match f.get("posts") {
                Some(Value::Array(posts)) => Some(posts.len() as u64),
                Some(other) => value_number(other),
                None => None,
            },
            ..Default::default()
        },
        certifications: certs.iter().filter_map(certification_label).collect(),
        companies,
        education: education(f),
        summary: f.text(&["about", "summary"]).unwrap_or_default(),
        ..Default::default()
    }
}

fn display_name(f: &Fields<'_>) -> String {
    if let Some(name) = f.text(&["name", "full_name"]) {
        return name;
    }
    let parts: Vec<String> = [f.text(&["first_name"]), f.text(&["last_name"])]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        "Unknown".to_string()
    } else {
        parts.join(" ")
    }
}

fn company_from_experience(exp: &Value) -> Company {
    let end = item_text(exp, &["end_date"]);
    let flagged = exp.get("is_current").and_then(Value::as_bool).unwrap_or(false);
    Company {
        name: item_text(exp, &["company", "company_name"]).unwrap_or_default(),
        role: item_text(exp, &["title"]).unwrap_or_default(),
        duration: item_text(exp, &["duration"]),
        current: flagged || end.map_or(true, |e| e.eq_ignore_ascii_case("present")),
    }
}

fn certification_label(cert: &Value) -> Option<String> {
    let title = item_text(cert, &["title"])?;
    Some(match item_text(cert, &["subtitle", "issuer"]) {
        Some(issuer) => format!("{} ({})", title, issuer),
        None => title,
    })
}

fn education(f: &Fields<'_>) -> Vec<Education> {
    let entries = f.array("education");
    if !entries.is_empty() {
        return entries
            .iter()
            .map(|e| Education {
                institution: item_text(e, &["title", "school_name", "school"]).unwrap_or_default(),
                degree: item_text(e, &["degree"]),
                field: item_text(e, &["field", "field_of_study"]),
                year: e
                    .get("start_year")
                    .and_then(value_number)
                    .map(|y| y as i32),
            })
            .collect();
    }
    f.text(&["educations_details"])
        .map(|institution| {
            vec![Education {
                institution,
                ..Default::default()
            }]
        })
        .unwrap_or_default()
}

/// Sum of "N years M months" durations, rounded to whole years
fn experience_years(experiences: &[Value]) -> u32 {
    let months: u64 = experiences
        .iter()
        .filter_map(|e| item_text(e, &["duration"]))
        .map(|d| duration_months(&d))
        .sum();
    (months as f64 / 12.0).round() as u32
}

fn duration_months(duration: &str) -> u64 {
    let capture = |re: &Regex| {
        re.captures(duration)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    capture(&YEARS) * 12 + capture(&MONTHS)
}

fn leadership_roles(experiences: &[Value]) -> Vec<String> {
    experiences
        .iter()
        .filter_map(|e| item_text(e, &["title"]))
        .filter(|title| {
            let lower = title.to_lowercase();
            LEADERSHIP_TERMS.iter().any(|k| lower.contains(k))
        })
        .collect()
}
