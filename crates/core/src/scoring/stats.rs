//! # Battle Statistics
//!
//! Six sub-scores, each an integer in `0..=100`, computed from a canonical
//! profile with no randomness and no I/O.

use serde::{Deserialize, Serialize};

use super::tables::{
    contains_any, skill_tier, DIRECTOR_KEYWORDS, EXECUTIVE_KEYWORDS, LEADERSHIP_KEYWORDS,
    LEAD_KEYWORDS, MAX_SKILL_TIER, PRESTIGE_COMPANIES,
};
use crate::profile::CanonicalProfile;

/// The six battle stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStats {
    pub technical: u32,
    pub strategy: u32,
    pub execution: u32,
    pub leadership: u32,
    pub impact: u32,
    pub experience: u32,
}

/// Names a stat, in ranking order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Technical,
    Strategy,
    Execution,
    Leadership,
    Impact,
    Experience,
}

impl BattleStats {
    /// Score every stat for `profile`
    pub fn from_profile(profile: &CanonicalProfile) -> Self {
        Self {
            technical: score_technical(profile),
            strategy: score_strategy(profile),
            execution: score_execution(profile),
            leadership: score_leadership(profile),
            impact: score_impact(profile),
            experience: score_experience(profile.years_experience),
        }
    }

    /// Stats paired with their kind, in canonical order
    pub fn entries(&self) -> [(StatKind, u32); 6] {
        [
            (StatKind::Technical, self.technical),
            (StatKind::Strategy, self.strategy),
            (StatKind::Execution, self.execution),
            (StatKind::Leadership, self.leadership),
            (StatKind::Impact, self.impact),
            (StatKind::Experience, self.experience),
        ]
    }

    /// Stats sorted high to low; ties keep canonical order
    pub fn ranked(&self) -> Vec<(StatKind, u32)> {
        let mut entries = self.entries().to_vec();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// Mean absolute deviation from the mean
    pub fn spread(&self) -> f64 {
        let values = self.entries().map(|(_, v)| v as f64);
        let mean = values.iter().sum::<f64>() / 6.0;
        values.iter().map(|v| (v - mean).abs()).sum::<f64>() / 6.0
    }
}

fn percent(value: u32) -> u32 {
    value.min(100)
}

/// Skill tiers over the maximum attainable, with project tech at half weight
/// and a star bonus
pub fn score_technical(profile: &CanonicalProfile) -> u32 {
    let mut total = 0.0_f64;
    let mut max = 0.0_f64;

    for skill in &profile.skills {
        total += skill_tier(skill) as f64;
        max += MAX_SKILL_TIER as f64;
    }

    for tech in profile.projects.iter().flat_map(|p| &p.technologies) {
        total += skill_tier(tech) as f64 * 0.5;
        max += MAX_SKILL_TIER as f64 * 0.5;
    }

    total += match profile.total_stars() {
        s if s > 1000 => 20.0,
        s if s > 500 => 15.0,
        s if s > 100 => 10.0,
        s if s > 10 => 5.0,
        _ => 0.0,
    };
    max += 20.0;

    ((total / max * 100.0).min(100.0)).round() as u32
}

pub fn score_strategy(profile: &CanonicalProfile) -> u32 {
    let projects = profile.projects.len() as u32;
    let mut score = (projects * 6).min(30);

    let desc_total: usize = profile
        .projects
        .iter()
        .map(|p| p.description.chars().count())
        .sum();
    let avg_desc = desc_total as f64 / projects.max(1) as f64;
    score += match avg_desc {
        a if a > 200.0 => 15,
        a if a > 100.0 => 10,
        a if a > 50.0 => 5,
        _ => 0,
    };

    score += (profile.achievements.len() as u32 * 10).min(30);
    score += (profile.certifications.len() as u32 * 5).min(15);
    score += (profile.education.len() as u32 * 5).min(10);

    percent(score)
}

/// Activity metrics. A metric of zero is treated as missing.
pub fn score_execution(profile: &CanonicalProfile) -> u32 {
    let metrics = &profile.metrics;
    let present = |v: Option<u64>| v.filter(|n| *n > 0);
    let mut score = 0u32;

    if let Some(commits) = present(metrics.commits) {
        score += match commits {
            c if c > 5000 => 30,
            c if c > 1000 => 25,
            c if c > 500 => 20,
            c if c > 100 => 15,
            _ => 10,
        };
    }
    if let Some(contributions) = present(metrics.contributions) {
        score += match contributions {
            c if c > 2000 => 25,
            c if c > 500 => 20,
            c if c > 100 => 15,
            _ => 10,
        };
    }
    if let Some(prs) = present(metrics.pull_requests) {
        score += prs.min(15) as u32;
    }
    if let Some(repos) = present(metrics.repositories) {
        score += match repos {
            r if r > 100 => 15,
            r if r > 50 => 12,
            r if r > 20 => 8,
            _ => 5,
        };
    }
    if let Some(posts) = present(metrics.posts) {
        score += posts.min(10) as u32;
    }

    if score == 0 && !profile.projects.is_empty() {
        score = profile.projects.len() as u32 * 10;
    }

    percent(score)
}

fn audience_points(count: Option<u64>) -> u32 {
    match count.unwrap_or(0) {
        n if n > 10_000 => 20,
        n if n > 5_000 => 15,
        n if n > 1_000 => 10,
        n if n > 500 => 5,
        _ => 0,
    }
}

fn role_points(role: &str) -> u32 {
    if !contains_any(role, LEADERSHIP_KEYWORDS) {
        0
    } else if contains_any(role, EXECUTIVE_KEYWORDS) {
        25
    } else if contains_any(role, DIRECTOR_KEYWORDS) {
        20
    } else if contains_any(role, LEAD_KEYWORDS) {
        15
    } else {
        10
    }
}

pub fn score_leadership(profile: &CanonicalProfile) -> u32 {
    let roles: u32 = profile.leadership_roles.iter().map(|r| role_points(r)).sum();
    let company_roles = profile
        .companies
        .iter()
        .filter(|c| contains_any(&c.role, LEADERSHIP_KEYWORDS))
        .count() as u32
        * 10;

    percent(roles + company_roles + audience_points(profile.metrics.followers))
}

pub fn score_impact(profile: &CanonicalProfile) -> u32 {
    let mut score = match profile.total_stars() {
        s if s > 10_000 => 40,
        s if s > 5_000 => 35,
        s if s > 1_000 => 30,
        s if s > 500 => 25,
        s if s > 100 => 20,
        s if s > 10 => 10,
        _ => 0,
    };
    score += match profile.total_forks() {
        f if f > 1_000 => 20,
        f if f > 500 => 15,
        f if f > 100 => 10,
        f if f > 10 => 5,
        _ => 0,
    };
    score += audience_points(profile.metrics.connections);

    if profile
        .companies
        .iter()
        .any(|c| contains_any(&c.name, PRESTIGE_COMPANIES))
    {
        score += 15;
    }

    score += (profile.achievements.len() as u32 * 5).min(15);

    percent(score)
}

pub fn score_experience(years: u32) -> u32 {
    match years {
        y if y >= 20 => 100,
        y if y >= 15 => 90,
        y if y >= 10 => 80,
        y if y >= 7 => 70,
        y if y >= 5 => 60,
        y if y >= 3 => 45,
        y if y >= 2 => 35,
        y if y >= 1 => 25,
        _ => 15,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ActivityMetrics, Company, Project};

    fn project(stars: u64, forks: u64) -> Project {
        Project {
            name: "proj".into(),
            stars,
            forks,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_profile_floor() {
        let stats = BattleStats::from_profile(&CanonicalProfile::default());
        assert_eq!(
            stats,
            BattleStats {
                experience: 15,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_technical_uses_half_weight_project_tech() {
        let profile = CanonicalProfile {
            skills: vec!["Rust".into(), "Excel".into()],
            projects: vec![Project {
                technologies: vec!["Kubernetes".into()],
                ..project(0, 0)
            }],
            ..Default::default()
        };
        // (10 + 2 + 5) / (20 + 5 + 20) = 37.8%
        assert_eq!(score_technical(&profile), 38);
    }

    #[test]
    fn test_execution_zero_metrics_fall_back_to_projects() {
        let profile = CanonicalProfile {
            metrics: ActivityMetrics {
                commits: Some(0),
                repositories: Some(0),
                ..Default::default()
            },
            projects: vec![project(0, 0), project(0, 0), project(0, 0)],
            ..Default::default()
        };
        assert_eq!(score_execution(&profile), 30);
    }

    #[test]
    fn test_execution_caps_at_hundred() {
        let profile = CanonicalProfile {
            metrics: ActivityMetrics {
                commits: Some(9000),
                contributions: Some(3000),
                pull_requests: Some(400),
                repositories: Some(150),
                posts: Some(90),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(score_execution(&profile), 95);
    }

    #[test]
    fn test_leadership_tiers() {
        assert_eq!(role_points("Co-Founder & CTO"), 25);
        assert_eq!(role_points("VP of Engineering"), 20);
        assert_eq!(role_points("Staff Engineer"), 15);
        assert_eq!(role_points("Solutions Architect"), 10);
        assert_eq!(role_points("Software Engineer"), 0);

        let profile = CanonicalProfile {
            leadership_roles: vec!["Engineering Manager".into()],
            companies: vec![Company {
                name: "Acme".into(),
                role: "Tech Lead".into(),
                ..Default::default()
            }],
            metrics: ActivityMetrics {
                followers: Some(1200),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(score_leadership(&profile), 15 + 10 + 10);
    }

    #[test]
    fn test_impact_prestige_counted_once() {
        let profile = CanonicalProfile {
            projects: vec![project(600, 120)],
            companies: vec![
                Company {
                    name: "Google".into(),
                    ..Default::default()
                },
                Company {
                    name: "Meta Platforms".into(),
                    ..Default::default()
                },
            ],
            achievements: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ..Default::default()
        };
        assert_eq!(score_impact(&profile), 25 + 10 + 15 + 15);
    }

    #[test]
    fn test_experience_ladder() {
        assert_eq!(score_experience(0), 15);
        assert_eq!(score_experience(2), 35);
        assert_eq!(score_experience(12), 80);
        assert_eq!(score_experience(40), 100);
    }

    #[test]
    fn test_ranked_is_stable() {
        let stats = BattleStats {
            technical: 50,
            strategy: 70,
            execution: 50,
            leadership: 70,
            impact: 10,
            experience: 50,
        };
        let order: Vec<_> = stats.ranked().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            order,
            vec![
                StatKind::Strategy,
                StatKind::Leadership,
                StatKind::Technical,
                StatKind::Execution,
                StatKind::Experience,
                StatKind::Impact,
            ]
        );
    }
}
