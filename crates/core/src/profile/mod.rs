//! # Canonical Profile
//!
//! The single shape every acquisition is normalized into. Every field is
//! populated (empty strings, empty lists, zero) so scoring never has to
//! branch on a missing value. Activity metrics are the exception: they stay
//! optional because "unknown" and "zero" score differently.

use serde::{Deserialize, Serialize};

use crate::acquisition::Platform;

mod github;
mod linkedin;
mod normalize;
mod wikipedia;

pub use normalize::{normalize, normalize_at};

/// Normalized view of one fighter's public profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalProfile {
    pub name: String,
    pub title: String,
    pub avatar: String,
    pub location: String,
    pub skills: Vec<String>,
    pub years_experience: u32,
    pub leadership_roles: Vec<String>,
    pub projects: Vec<Project>,
    pub achievements: Vec<String>,
    pub metrics: ActivityMetrics,
    pub certifications: Vec<String>,
    pub companies: Vec<Company>,
    pub education: Vec<Education>,
    pub summary: String,
    pub source_url: String,
    pub source_type: Platform,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub stars: u64,
    pub forks: u64,
}

/// Activity counters; `None` means the source did not report the metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityMetrics {
    pub commits: Option<u64>,
    pub contributions: Option<u64>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub repositories: Option<u64>,
    pub pull_requests: Option<u64>,
    pub issues: Option<u64>,
    pub posts: Option<u64>,
    pub connections: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
    pub role: String,
    pub duration: Option<String>,
    pub current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub year: Option<i32>,
}

impl CanonicalProfile {
    /// Sum of stars across all projects
    pub fn total_stars(&self) -> u64 {
        self.projects.iter().map(|p| p.stars).sum()
    }

    /// Sum of forks across all projects
    pub fn total_forks(&self) -> u64 {
        self.projects.iter().map(|p| p.forks).sum()
    }
}
