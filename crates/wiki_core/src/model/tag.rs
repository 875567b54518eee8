//! Tag set normalization.
//!
//! # Invariants
//! - Tags are trimmed; blank tags are dropped.
//! - Case is preserved, so `Rust` and `rust` are different tags.
//! - A normalized tag list is deduplicated and sorted.

use std::collections::BTreeSet;

/// Normalizes one tag value. Returns `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalizes and deduplicates tag values.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag.as_ref()) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

/// Splits free-text form input (`"grace, hopper kelly"`) into a tag set.
///
/// Commas and whitespace both separate tags.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    normalize_tags(input.split(|c: char| c == ',' || c.is_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags, parse_tag_list};

    #[test]
    fn normalize_tag_trims_and_keeps_case() {
        assert_eq!(normalize_tag("  Grace "), Some("Grace".to_string()));
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn normalize_tags_deduplicates_and_sorts() {
        let tags = normalize_tags(["hopper", "grace", " hopper", ""]);
        assert_eq!(tags, vec!["grace".to_string(), "hopper".to_string()]);
    }

    #[test]
    fn parse_tag_list_splits_on_commas_and_whitespace() {
        let tags = parse_tag_list("grace, hopper  kelly,,grace");
        assert_eq!(tags, vec!["grace", "hopper", "kelly"]);
    }
}
