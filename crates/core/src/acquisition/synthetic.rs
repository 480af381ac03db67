//! # Synthetic Profile Catalog
//!
//! Demo fighters substituted when real acquisition fails. Selection avoids
//! handing the same identity to both fighters of one duel while distinct
//! entries remain.

use std::collections::HashSet;

use serde_json::Value;

use super::{JsonObject, Platform, RawAcquisition};
use crate::profile::{ActivityMetrics, CanonicalProfile, Company, Education, Project};
use crate::random::RandomSource;

/// Fixed catalog of pre-normalized profiles
#[derive(Debug, Clone)]
pub struct SyntheticCatalog {
    profiles: Vec<CanonicalProfile>,
}

impl Default for SyntheticCatalog {
    fn default() -> Self {
        Self {
            profiles: vec![alex_chen(), sarah_kim(), marcus_johnson()],
        }
    }
}

impl SyntheticCatalog {
    pub fn new(profiles: Vec<CanonicalProfile>) -> Self {
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CanonicalProfile> {
        self.profiles.get(index)
    }

    /// Pick a catalog index, skipping entries in `used` while unused ones remain.
    /// The chosen index is recorded in `used`.
    pub fn select(&self, used: &mut HashSet<usize>, random: &dyn RandomSource) -> usize {
        let len = self.profiles.len();
        if len == 0 {
            return 0;
        }
        let mut index = random.pick(len) % len;
        while used.contains(&index) && used.len() < len {
            index = (index + 1) % len;
        }
        used.insert(index);
        index
    }

    /// Build a tagged acquisition from a catalog entry
    pub fn materialize(&self, index: usize, url: &str, platform: Platform) -> RawAcquisition {
        let mut profile = self.profiles.get(index).cloned().unwrap_or_default();
        profile.source_url = url.to_string();
        profile.source_type = platform;

        let payload = match serde_json::to_value(&profile) {
            Ok(Value::Object(map)) => map,
            _ => JsonObject::new(),
        };

        RawAcquisition {
            synthetic: true,
            ..RawAcquisition::new(platform, url, payload)
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn project(name: &str, description: &str, stars: u64, forks: u64) -> Project {
    Project {
        name: name.to_string(),
        description: description.to_string(),
        stars,
        forks,
        ..Project::default()
    }
}

fn company(name: &str, role: &str, current: bool) -> Company {
    Company {
        name: name.to_string(),
        role: role.to_string(),
        duration: None,
        current,
    }
}

fn education(institution: &str, degree: &str, field: &str) -> Education {
    Education {
        institution: institution.to_string(),
        degree: Some(degree.to_string()),
        field: Some(field.to_string()),
        year: None,
    }
}

fn alex_chen() -> CanonicalProfile {
    CanonicalProfile {
        name: "Alex Chen".into(),
        title: "Senior Software Engineer".into(),
        skills: strings(&[
            "TypeScript", "React", "Node.js", "AWS", "PostgreSQL", "Docker", "Kubernetes",
        ]),
        years_experience: 8,
        leadership_roles: strings(&["Tech Lead", "Mentor"]),
        projects: vec![
            project("CloudScale", "Distributed microservices platform", 450, 89),
            project("ReactFlow", "Advanced state management library", 1200, 230),
        ],
        achievements: strings(&["AWS Certified Solutions Architect", "Google Cloud Professional"]),
        metrics: ActivityMetrics {
            commits: Some(2500),
            contributions: Some(890),
            followers: Some(1200),
            repositories: Some(45),
            ..ActivityMetrics::default()
        },
        certifications: strings(&["AWS Solutions Architect", "Kubernetes Administrator"]),
        companies: vec![
            company("TechCorp", "Senior Engineer", true),
            company("StartupXYZ", "Full Stack Developer", false),
        ],
        education: vec![education("MIT", "BS", "Computer Science")],
        summary: "Passionate about building scalable systems".into(),
        ..CanonicalProfile::default()
    }
}

fn sarah_kim() -> CanonicalProfile {
    CanonicalProfile {
        name: "Sarah Kim".into(),
        title: "Staff Engineer".into(),
        skills: strings(&[
            "Python", "Machine Learning", "TensorFlow", "PyTorch", "Rust", "Go", "System Design",
        ]),
        years_experience: 12,
        leadership_roles: strings(&["Staff Engineer", "Architecture Lead", "Team Lead"]),
        projects: vec![
            project("MLPipeline", "End-to-end ML infrastructure", 3400, 567),
            project("FastPredict", "Real-time inference engine", 890, 145),
        ],
        achievements: strings(&["Patent holder", "Conference Speaker", "Open Source Maintainer"]),
        metrics: ActivityMetrics {
            commits: Some(5000),
            contributions: Some(2100),
            followers: Some(5600),
            repositories: Some(78),
            ..ActivityMetrics::default()
        },
        certifications: strings(&["Google ML Engineer", "Deep Learning Specialization"]),
        companies: vec![
            company("Google", "Staff Engineer", true),
            company("Meta", "Senior Engineer", false),
        ],
        education: vec![education("Stanford", "PhD", "Machine Learning")],
        summary: "Building the future of AI infrastructure".into(),
        ..CanonicalProfile::default()
    }
}

fn marcus_johnson() -> CanonicalProfile {
    CanonicalProfile {
        name: "Marcus Johnson".into(),
        title: "Engineering Manager".into(),
        skills: strings(&[
            "Java", "Spring Boot", "Microservices", "Leadership", "Architecture", "DevOps",
        ]),
        years_experience: 15,
        leadership_roles: strings(&["Engineering Manager", "Director", "VP Engineering"]),
        projects: vec![project(
            "EnterpriseCore",
            "Enterprise integration platform",
            780,
            234,
        )],
        achievements: strings(&["Built teams from 5 to 50 engineers", "IPO experience"]),
        metrics: ActivityMetrics {
            commits: Some(1200),
            followers: Some(3400),
            connections: Some(8900),
            ..ActivityMetrics::default()
        },
        certifications: strings(&["PMP", "Agile Coach"]),
        companies: vec![
            company("Stripe", "Engineering Manager", true),
            company("Amazon", "Senior Manager", false),
        ],
        education: vec![education("Berkeley", "MS", "Computer Science")],
        summary: "Building high-performing engineering teams".into(),
        ..CanonicalProfile::default()
    }
}
