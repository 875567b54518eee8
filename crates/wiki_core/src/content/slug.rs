//! Url title (slug) derivation.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Replaces each whitespace run with one underscore.
///
/// Case and every other character are kept verbatim, so
/// `slugify("Title of this page") == "Title_of_this_page"`.
pub fn slugify(title: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(title, "_").into_owned()
}
