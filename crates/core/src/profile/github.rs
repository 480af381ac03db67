//! Code-host mapping (GitHub REST user + repositories, DOM overrides).

use chrono::{DateTime, Datelike};
use serde_json::Value;

use super::normalize::{
    group_thousands, item_text, push_unique, value_number, value_text, Fields, MAX_SKILLS,
};
use super::{ActivityMetrics, CanonicalProfile, Company, Project};

const MAX_PROJECTS: usize = 10;

pub(super) fn map(f: &Fields<'_>, current_year: i32) -> CanonicalProfile {
    let repos = f.array("repositories");
    let bio = f.text(&["bio"]);

    CanonicalProfile {
        name: f
            .text(&["name", "login"])
            .unwrap_or_else(|| "Unknown".to_string()),
        title: bio.clone().unwrap_or_else(|| "Developer".to_string()),
        avatar: f.text(&["avatar_url", "avatar"]).unwrap_or_default(),
        location: f.text(&["location"]).unwrap_or_default(),
        skills: repo_skills(repos),
        years_experience: account_years(f.text(&["created_at"]).as_deref(), current_year),
        projects: top_projects(repos),
        achievements: achievements(f, repos),
        metrics: ActivityMetrics {
            repositories: f
                .number(&["public_repos"])
                .filter(|n| *n > 0)
                .or(Some(repos.len() as u64)),
            followers: f.number(&["followers"]),
            following: f.number(&["following"]),
            contributions: f.number(&["contributions"]),
            commits: Some(
                repos
                    .iter()
                    .filter_map(|r| r.get("commits_count"))
                    .filter_map(value_number)
                    .sum(),
            ),
            ..Default::default()
        },
        companies: f
            .text(&["company"])
            .map(|c| {
                vec![Company {
                    name: c.trim_start_matches('@').to_string(),
                    role: "Developer".to_string(),
                    duration: None,
                    current: true,
                }]
            })
            .unwrap_or_default(),
        summary: bio.unwrap_or_default(),
        ..Default::default()
    }
}

fn stars(repo: &Value) -> u64 {
    repo.get("stargazers_count")
        .and_then(value_number)
        .unwrap_or(0)
}

fn top_projects(repos: &[Value]) -> Vec<Project> {
    let mut sorted: Vec<&Value> = repos.iter().collect();
    sorted.sort_by(|a, b| stars(b).cmp(&stars(a)));
    sorted
        .into_iter()
        .take(MAX_PROJECTS)
        .map(|repo| Project {
            name: item_text(repo, &["name"]).unwrap_or_default(),
            description: item_text(repo, &["description"]).unwrap_or_default(),
            technologies: item_text(repo, &["language"]).into_iter().collect(),
            url: item_text(repo, &["html_url", "url"]),
            stars: stars(repo),
            forks: repo.get("forks_count").and_then(value_number).unwrap_or(0),
        })
        .collect()
}

/// Primary languages, language lists and topics in first-seen order
fn repo_skills(repos: &[Value]) -> Vec<String> {
    let mut skills = Vec::new();
    for repo in repos {
        let listed = |key: &str| -> Vec<String> {
            repo.get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(value_text).collect())
                .unwrap_or_default()
        };
        let candidates = item_text(repo, &["language"])
            .into_iter()
            .chain(listed("languages"))
            .chain(listed("topics"));
        for skill in candidates {
            push_unique(&mut skills, skill);
        }
    }
    skills.truncate(MAX_SKILLS);
    skills
}

/// Whole years since account creation, at least 1; 0 when unknown
fn account_years(created_at: Option<&str>, current_year: i32) -> u32 {
    let Some(created_at) = created_at else {
        return 0;
    };
    let year = DateTime::parse_from_rfc3339(created_at)
        .map(|d| d.year())
        .ok()
        .or_else(|| created_at.get(..4).and_then(|y| y.parse().ok()));
    match year {
        Some(year) => (current_year - year).max(1) as u32,
        None => 0,
    }
}

fn achievements(f: &Fields<'_>, repos: &[Value]) -> Vec<String> {
    let total_stars: u64 = repos.iter().map(stars).sum();
    let followers = f.number(&["followers"]).unwrap_or(0);
    let public_repos = f
        .number(&["public_repos"])
        .filter(|n| *n > 0)
        .unwrap_or(repos.len() as u64);

    let mut out = Vec::new();
    if total_stars >= 1000 {
        out.push(format!("{} total GitHub stars", group_thousands(total_stars)));
    }
    if followers >= 100 {
        out.push(format!("{} GitHub followers", group_thousands(followers)));
    }
    if public_repos >= 50 {
        out.push(format!("{} public repositories", group_thousands(public_repos)));
    }
    if repos.iter().any(|r| stars(r) >= 100) {
        out.push("Maintains popular open source project".to_string());
    }
    out
}
