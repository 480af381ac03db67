//! Dispatch from a raw acquisition to the per-platform mapping, plus the
//! lenient field readers the mappings share.

use chrono::{Datelike, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{github, linkedin, wikipedia, ActivityMetrics, CanonicalProfile};
use crate::acquisition::{JsonObject, Platform, RawAcquisition};

/// Skills kept per profile
pub(super) const MAX_SKILLS: usize = 20;

/// Normalize using the current UTC year for age-derived fields
pub fn normalize(raw: &RawAcquisition) -> CanonicalProfile {
    normalize_at(raw, Utc::now().year())
}

/// Normalize with an explicit current year
pub fn normalize_at(raw: &RawAcquisition, current_year: i32) -> CanonicalProfile {
    if raw.synthetic {
        match serde_json::from_value::<CanonicalProfile>(Value::Object(raw.payload.clone())) {
            Ok(profile) => return profile,
            Err(e) => {
                tracing::warn!(url = %raw.url, "Synthetic payload did not deserialize: {}", e);
            }
        }
    }

    let fields = Fields::new(&raw.payload);
    let mut profile = match raw.platform {
        Platform::LinkedIn => linkedin::map(&fields),
        Platform::GitHub => github::map(&fields, current_year),
        Platform::Wikipedia => wikipedia::map(&fields, current_year),
        Platform::Generic => map_generic(&fields),
    };
    profile.source_url = raw.url.clone();
    profile.source_type = raw.platform;
    profile.skills.truncate(MAX_SKILLS);
    profile
}

/// Fallback mapping for arbitrary pages: reads whatever canonical-looking
/// fields the capture produced.
fn map_generic(f: &Fields<'_>) -> CanonicalProfile {
    CanonicalProfile {
        name: f
            .text(&["name", "full_name", "title"])
            .unwrap_or_else(|| "Unknown Warrior".to_string()),
        title: f
            .text(&["title", "position", "headline", "role"])
            .unwrap_or_else(|| "Developer".to_string()),
        avatar: f.text(&["avatar", "image"]).unwrap_or_default(),
        location: f.text(&["location"]).unwrap_or_default(),
        skills: f.strings("skills"),
        years_experience: f
            .number(&["years_experience", "experience"])
            .unwrap_or(0) as u32,
        leadership_roles: f.strings("leadership_roles"),
        projects: f.typed("projects").unwrap_or_default(),
        achievements: f.strings("achievements"),
        metrics: f.typed::<ActivityMetrics>("metrics").unwrap_or_default(),
        certifications: f.strings("certifications"),
        companies: f.typed("companies").unwrap_or_default(),
        education: f.typed("education").unwrap_or_default(),
        summary: f
            .text(&["summary", "about", "description"])
            .unwrap_or_default(),
        ..Default::default()
    }
}

/// Read-only view over a loosely typed payload
pub(super) struct Fields<'a> {
    map: &'a JsonObject,
}

impl<'a> Fields<'a> {
    pub(super) fn new(map: &'a JsonObject) -> Self {
        Self { map }
    }

    pub(super) fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    /// First non-empty trimmed string among `keys`
    pub(super) fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.map.get(*k))
            .find_map(value_text)
    }

    /// First value among `keys` readable as a count
    pub(super) fn number(&self, keys: &[&str]) -> Option<u64> {
        keys.iter()
            .filter_map(|k| self.map.get(*k))
            .find_map(value_number)
    }

    pub(super) fn array(&self, key: &str) -> &'a [Value] {
        match self.map.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// Nested object at `key`
    pub(super) fn object(&self, key: &str) -> Option<&'a JsonObject> {
        self.map.get(key).and_then(Value::as_object)
    }

    /// String items of an array field, trimmed, empties dropped
    pub(super) fn strings(&self, key: &str) -> Vec<String> {
        self.array(key).iter().filter_map(value_text).collect()
    }

    fn typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.map
            .get(key)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

/// Trimmed non-empty string, or a number rendered as text
pub(super) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A JSON number, or the leading digits of a string with commas removed
pub(super) fn value_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .replace(',', "")
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// String field of a nested object, for array items
pub(super) fn item_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find_map(value_text)
}

/// `1234567` -> `1,234,567`
pub(super) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Push `item` unless already present, preserving first-seen order
pub(super) fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(platform: Platform, payload: Value) -> RawAcquisition {
        let map = match payload {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        RawAcquisition::new(platform, "https://example.com/someone", map)
    }

    #[test]
    fn test_value_number_forms() {
        assert_eq!(value_number(&json!(42)), Some(42));
        assert_eq!(value_number(&json!("1,234 contributions")), Some(1234));
        assert_eq!(value_number(&json!("n/a")), None);
        assert_eq!(value_number(&json!(-3)), None);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_generic_defaults() {
        let profile = normalize_at(&raw(Platform::Generic, json!({})), 2026);
        assert_eq!(profile.name, "Unknown Warrior");
        assert_eq!(profile.title, "Developer");
        assert_eq!(profile.source_type, Platform::Generic);
        assert_eq!(profile.source_url, "https://example.com/someone");
    }

    #[test]
    fn test_generic_reads_canonical_shapes() {
        let payload = json!({
            "full_name": "Pat Doe",
            "headline": "Platform Engineer",
            "skills": ["Go", " ", "Terraform"],
            "projects": [{ "name": "infra", "stars": 12 }],
            "about": "Builds things",
        });
        let profile = normalize_at(&raw(Platform::Generic, payload), 2026);
        assert_eq!(profile.name, "Pat Doe");
        assert_eq!(profile.title, "Platform Engineer");
        assert_eq!(profile.skills, vec!["Go", "Terraform"]);
        assert_eq!(profile.projects[0].stars, 12);
        assert_eq!(profile.summary, "Builds things");
    }

    #[test]
    fn test_synthetic_passes_through() {
        let original = CanonicalProfile {
            name: "Alex".into(),
            skills: (0..25).map(|i| format!("s{}", i)).collect(),
            source_url: "https://linkedin.com/in/x".into(),
            source_type: Platform::LinkedIn,
            ..Default::default()
        };
        let payload = serde_json::to_value(&original).unwrap();
        let mut acquisition = raw(Platform::LinkedIn, payload);
        acquisition.synthetic = true;

        assert_eq!(normalize_at(&acquisition, 2026), original);
    }
}
