use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

const MAX_SLUG_LEN: usize = 50;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("static slug pattern"))
}

/// Returns true if `slug` matches the canonical slug pattern.
pub fn is_valid_slug(slug: &str) -> bool {
    slug_pattern().is_match(slug)
}

/// Generate a fresh RFC 4122 v4 UUID in canonical hyphenated form.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Derive a URL-safe slug from a human-readable name.
///
/// Lowercases, maps whitespace/underscores to hyphens, strips characters
/// outside `[a-z0-9-]`, collapses consecutive hyphens, trims leading/trailing
/// hyphens, and truncates to 50 characters (re-stripping a trailing hyphen
/// left by truncation). Returns an empty string only when `name` contains no
/// slug-producing characters at all.
pub fn generate_slug(name: &str) -> String {
    let lowered = name.to_lowercase();

    let mut mapped = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            mapped.push(ch);
        } else if ch.is_whitespace() || ch == '_' || ch == '-' {
            mapped.push('-');
        }
        // anything else is dropped entirely
    }

    let mut collapsed = String::with_capacity(mapped.len());
    let mut last_was_hyphen = false;
    for ch in mapped.chars() {
        if ch == '-' {
            if !last_was_hyphen {
                collapsed.push('-');
            }
            last_was_hyphen = true;
        } else {
            collapsed.push(ch);
            last_was_hyphen = false;
        }
    }

    let trimmed = collapsed.trim_matches('-');
    let truncated: String = trimmed.chars().take(MAX_SLUG_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}
