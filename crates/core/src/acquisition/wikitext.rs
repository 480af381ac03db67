//! # Wikitext Infobox Parsing
//!
//! Extracts `| key = value` fields from the first `{{Infobox ...}}` template
//! and strips wiki markup from the values. Templates are rewritten
//! innermost-first so nested lists and dates collapse cleanly.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use super::JsonObject;

static REF_SELF_CLOSING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<ref[^>]*/>").expect("valid regex"));
static REF_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<ref[^>]*>.*?</ref>").expect("valid regex"));
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(?:[^\]|]*\|)?([^\]|]*)\]\]").expect("valid regex"));
static EXTERNAL_LINK_LABELED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[https?://\S+\s+([^\]]+)\]").expect("valid regex"));
static EXTERNAL_LINK_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[https?://[^\]\s]+\]").expect("valid regex"));
static INNER_TEMPLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"));
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"'{2,}").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*,\s*)+,").expect("valid regex"));

/// Nesting guard for template rewriting
const MAX_TEMPLATE_PASSES: usize = 16;

/// Parse the first infobox in `wikitext` into a flat key/value map
pub fn parse_infobox(wikitext: &str) -> JsonObject {
    let mut fields = JsonObject::new();
    let Some(body) = infobox_body(wikitext) else {
        return fields;
    };

    let mut current: Option<(String, String)> = None;
    let mut depth: i32 = 0;

    for line in body.lines() {
        let trimmed = line.trim();
        if depth == 0 && trimmed.starts_with('|') {
            if let Some((key, value)) = current.take() {
                insert_cleaned(&mut fields, key, &value);
            }
            current = trimmed[1..].split_once('=').map(|(k, v)| {
                (
                    k.trim().to_lowercase().replace(' ', "_"),
                    v.trim().to_string(),
                )
            });
        } else if let Some((_, value)) = current.as_mut() {
            value.push('\n');
            value.push_str(trimmed);
        }
        depth += brace_delta(line);
        depth = depth.max(0);
    }

    if let Some((key, value)) = current {
        insert_cleaned(&mut fields, key, &value);
    }
    fields
}

fn insert_cleaned(fields: &mut JsonObject, key: String, raw: &str) {
    if key.is_empty() {
        return;
    }
    let value = clean_markup(raw);
    if !value.is_empty() {
        fields.insert(key, Value::String(value));
    }
}

/// Content between the infobox header line and its matching `}}`
fn infobox_body(wikitext: &str) -> Option<&str> {
    let start = wikitext.to_ascii_lowercase().find("{{infobox")?;
    let bytes = wikitext.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'{') => {
                depth += 1;
                i += 2;
            }
            (b'}', b'}') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let header_end = wikitext[start..i].find('\n').map(|n| start + n + 1)?;
                    return Some(&wikitext[header_end..i]);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }
    None
}

fn brace_delta(line: &str) -> i32 {
    line.matches("{{").count() as i32 - line.matches("}}").count() as i32
}

/// Strip wiki markup down to readable text
pub fn clean_markup(text: &str) -> String {
    let text = COMMENT.replace_all(text, "");
    let text = REF_SELF_CLOSING.replace_all(&text, "");
    let text = REF_BLOCK.replace_all(&text, "");
    let text = WIKI_LINK.replace_all(&text, "$1");
    let text = EXTERNAL_LINK_LABELED.replace_all(&text, "$1");
    let text = EXTERNAL_LINK_BARE.replace_all(&text, "");

    let mut text = text.into_owned();
    for _ in 0..MAX_TEMPLATE_PASSES {
        if !INNER_TEMPLATE.is_match(&text) {
            break;
        }
        text = INNER_TEMPLATE
            .replace_all(&text, |caps: &Captures| rewrite_template(&caps[1]))
            .into_owned();
    }

    let text = LINE_BREAK.replace_all(&text, ", ");
    let text = HTML_TAG.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = text.replace("\n*", ", ").replace('*', "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = SEPARATOR_RUN.replace_all(&text, ",");
    text.trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

/// Rewrite a template with no nested templates inside
fn rewrite_template(inner: &str) -> String {
    let mut parts = inner.split('|');
    let name = parts.next().unwrap_or_default().trim().to_lowercase();
    let params: Vec<&str> = parts.map(str::trim).collect();
    let positional: Vec<&str> = params
        .iter()
        .copied()
        .filter(|p| !p.contains('='))
        .collect();

    match name.as_str() {
        "flatlist" | "hlist" | "plainlist" | "unbulleted list" | "ubl" | "cslist" => params
            .iter()
            .flat_map(|p| p.split('\n'))
            .map(|item| item.trim().trim_start_matches('*').trim())
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        n if n.starts_with("birth date")
            || n.starts_with("death date")
            || n.starts_with("birth year")
            || n == "start date"
            || n == "dob" =>
        {
            positional
                .iter()
                .take(3)
                .filter(|p| !p.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("-")
        }
        "circa" | "c." => positional
            .first()
            .map(|y| format!("c. {}", y))
            .unwrap_or_default(),
        "url" | "nowrap" | "small" | "nobold" | "nobr" => {
            positional.first().map(|v| v.to_string()).unwrap_or_default()
        }
        _ => String::new(),
    }
}
