//! Page domain model.
//!
//! # Responsibility
//! - Define the canonical wiki page record and its lifecycle state.
//! - Run the pre-validation hook that derives `url_title` from `title`.
//! - Expose the virtual attributes `route` and `rendered_content`.
//!
//! # Invariants
//! - `id` stays `None` until the store assigns a primary key.
//! - An explicitly provided `url_title` is never overwritten by the hook.
//! - `tags` keep set semantics (trimmed, deduplicated, sorted).
//! - `rendered_content` is computed on every call and never cached.

use crate::content::markdown::render_markdown;
use crate::content::slug::slugify;
use crate::model::tag::{normalize_tag, normalize_tags};
use crate::model::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned primary key.
pub type PageId = i64;

/// Prefix of every page route.
pub const ROUTE_PREFIX: &str = "/wiki/";

/// Publication status of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PageStatus {
    /// Page accepts edits. Default for new pages.
    #[default]
    Open,
    /// Page is frozen.
    Closed,
}

impl PageStatus {
    /// Every accepted status, in wire order.
    pub const ALL: [PageStatus; 2] = [PageStatus::Open, PageStatus::Closed];

    const WIRE_VALUES: &'static [&'static str] = &["open", "closed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl Display for PageStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageStatus {
    type Err = InvalidEnumValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(InvalidEnumValue {
                field: "status",
                value: other.to_string(),
                allowed: Self::WIRE_VALUES,
            }),
        }
    }
}

impl TryFrom<String> for PageStatus {
    type Error = InvalidEnumValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Free-text value outside a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEnumValue {
    pub field: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl Display for InvalidEnumValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} `{}`; expected {}",
            self.field,
            self.value,
            self.allowed.join("|")
        )
    }
}

impl Error for InvalidEnumValue {}

/// Untrusted page input, as submitted by a form or API payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageAttributes {
    pub title: Option<String>,
    pub url_title: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    /// Checked against `PageStatus` in `Page::build`.
    pub status: Option<String>,
}

/// Where a page currently sits in its save sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageLifecycle {
    /// In memory only, not validated since the last change.
    #[default]
    Built,
    /// Passed the last validation run.
    Valid,
    /// Failed the last validation run; see `Page::errors`.
    Invalid,
    /// Matches a durable row.
    Persisted,
}

/// Wiki page record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    id: Option<PageId>,
    pub title: String,
    url_title: Option<String>,
    #[serde(skip)]
    url_title_explicit: bool,
    /// Markdown source.
    pub content: String,
    tags: Vec<String>,
    pub status: PageStatus,
    /// Epoch milliseconds, assigned by the store.
    created_at: Option<i64>,
    /// Epoch milliseconds, assigned by the store.
    updated_at: Option<i64>,
    #[serde(skip)]
    lifecycle: PageLifecycle,
    #[serde(skip)]
    errors: ValidationErrors,
}

/// Row shape handed back by repositories.
#[derive(Debug, Clone)]
pub(crate) struct StoredPage {
    pub id: PageId,
    pub title: String,
    pub url_title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub status: PageStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<StoredPage> for Page {
    fn from(row: StoredPage) -> Self {
        Self {
            id: Some(row.id),
            title: row.title,
            url_title: Some(row.url_title),
            // Loaded url titles are external identifiers; keep them stable.
            url_title_explicit: true,
            content: row.content,
            tags: normalize_tags(row.tags),
            status: row.status,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
            lifecycle: PageLifecycle::Persisted,
            errors: ValidationErrors::default(),
        }
    }
}

impl Page {
    /// Creates an unsaved page with default status and no tags.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Builds an unsaved page from untrusted attributes.
    ///
    /// # Errors
    /// - `InvalidEnumValue` when `status` is not a known wire value.
    pub fn build(attributes: PageAttributes) -> Result<Self, InvalidEnumValue> {
        let status = match attributes.status.as_deref() {
            Some(value) => value.parse()?,
            None => PageStatus::default(),
        };

        let mut page = Self::new(
            attributes.title.unwrap_or_default(),
            attributes.content.unwrap_or_default(),
        );
        page.status = status;
        page.set_tags(attributes.tags);
        if let Some(url_title) = attributes.url_title {
            page.set_url_title(url_title);
        }
        Ok(page)
    }

    pub fn id(&self) -> Option<PageId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn url_title(&self) -> Option<&str> {
        self.url_title.as_deref()
    }

    /// Sets the url title explicitly; the slug hook will leave it alone.
    pub fn set_url_title(&mut self, url_title: impl Into<String>) {
        self.url_title = Some(url_title.into());
        self.url_title_explicit = true;
    }

    /// Drops the current url title so the next hook run derives a fresh one.
    pub fn reset_url_title(&mut self) {
        self.url_title = None;
        self.url_title_explicit = false;
    }

    /// Sorted, deduplicated tag set.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replaces the tag set.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    /// Adds one tag. Returns `false` when blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };
        match self.tags.binary_search(&tag) {
            Ok(_) => false,
            Err(position) => {
                self.tags.insert(position, tag);
                true
            }
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.binary_search_by(|probe| probe.as_str().cmp(tag)).is_ok()
    }

    pub fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    pub fn lifecycle(&self) -> PageLifecycle {
        self.lifecycle
    }

    /// Violations from the most recent validation run, in check order.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Virtual attribute: `"/wiki/" + url_title`, once a url title exists.
    pub fn route(&self) -> Option<String> {
        self.url_title
            .as_deref()
            .map(|url_title| format!("{ROUTE_PREFIX}{url_title}"))
    }

    /// Virtual attribute: current `content` rendered to HTML.
    pub fn rendered_content(&self) -> String {
        render_markdown(&self.content)
    }

    /// Pre-validation hook: derives `url_title` from `title` unless a url
    /// title was provided explicitly. A blank title clears a derived one.
    pub fn apply_hooks(&mut self) {
        if self.url_title_explicit {
            return;
        }
        self.url_title = if self.title.trim().is_empty() {
            None
        } else {
            Some(slugify(&self.title))
        };
    }

    pub(crate) fn record_validation(&mut self, errors: ValidationErrors) {
        self.lifecycle = if errors.is_empty() {
            PageLifecycle::Valid
        } else {
            PageLifecycle::Invalid
        };
        self.errors = errors;
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageAttributes, PageLifecycle, PageStatus};
    use crate::model::validation::validate_page;
    use std::convert::Infallible;

    #[test]
    fn hook_derives_url_title_from_title() {
        let mut page = Page::new("Title of this page", "Content");
        page.apply_hooks();
        assert_eq!(page.url_title(), Some("Title_of_this_page"));
        assert_eq!(page.route().as_deref(), Some("/wiki/Title_of_this_page"));
    }

    #[test]
    fn hook_is_idempotent_and_follows_title_changes() {
        let mut page = Page::new("first draft", "x");
        page.apply_hooks();
        page.apply_hooks();
        assert_eq!(page.url_title(), Some("first_draft"));

        page.title = "second draft".to_string();
        page.apply_hooks();
        assert_eq!(page.url_title(), Some("second_draft"));
    }

    #[test]
    fn hook_never_overwrites_explicit_url_title() {
        let mut page = Page::new("Some title", "x");
        page.set_url_title("custom");
        page.apply_hooks();
        assert_eq!(page.url_title(), Some("custom"));

        page.reset_url_title();
        page.apply_hooks();
        assert_eq!(page.url_title(), Some("Some_title"));
    }

    #[test]
    fn hook_skips_blank_title() {
        let mut page = Page::new("  ", "x");
        page.apply_hooks();
        assert_eq!(page.url_title(), None);
        assert_eq!(page.route(), None);
    }

    #[test]
    fn clearing_title_drops_derived_url_title() {
        let mut page = Page::new("Anna", "x");
        page.apply_hooks();
        assert_eq!(page.url_title(), Some("Anna"));

        page.title = "   ".to_string();
        page.apply_hooks();
        assert_eq!(page.url_title(), None);
        assert_eq!(page.route(), None);

        let errors = validate_page(&page, |_, _| Ok::<_, Infallible>(false)).unwrap();
        assert_eq!(errors.paths(), ["title", "urlTitle"]);
    }

    #[test]
    fn clearing_title_keeps_explicit_url_title() {
        let mut page = Page::new("Anna", "x");
        page.set_url_title("anna-page");
        page.title = String::new();
        page.apply_hooks();
        assert_eq!(page.url_title(), Some("anna-page"));
    }

    #[test]
    fn build_rejects_unknown_status() {
        let err = Page::build(PageAttributes {
            title: Some("A".to_string()),
            status: Some("cat".to_string()),
            ..PageAttributes::default()
        })
        .unwrap_err();
        assert_eq!(err.field, "status");
        assert_eq!(err.value, "cat");
        assert!(err.to_string().contains("open|closed"));
    }

    #[test]
    fn build_applies_defaults() {
        let page = Page::build(PageAttributes {
            title: Some("A".to_string()),
            tags: vec!["b".to_string(), "a".to_string(), "b".to_string()],
            ..PageAttributes::default()
        })
        .unwrap();
        assert_eq!(page.status, PageStatus::Open);
        assert_eq!(page.tags(), ["a", "b"]);
        assert_eq!(page.id(), None);
        assert_eq!(page.lifecycle(), PageLifecycle::Built);
    }

    #[test]
    fn add_tag_keeps_set_semantics() {
        let mut page = Page::new("A", "x");
        assert!(page.add_tag("kelly"));
        assert!(page.add_tag("grace"));
        assert!(!page.add_tag(" grace "));
        assert!(!page.add_tag(""));
        assert_eq!(page.tags(), ["grace", "kelly"]);
        assert!(page.has_tag("grace"));
        assert!(!page.has_tag("Grace"));
    }

    #[test]
    fn rendered_content_tracks_current_content() {
        let mut page = Page::new("A", "first");
        assert!(page.rendered_content().contains("first"));
        page.content = "second".to_string();
        assert!(page.rendered_content().contains("second"));
        assert!(!page.rendered_content().contains("first"));
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("open".parse::<PageStatus>().unwrap(), PageStatus::Open);
        assert_eq!("closed".parse::<PageStatus>().unwrap(), PageStatus::Closed);
        assert!("Open".parse::<PageStatus>().is_err());
        assert_eq!(PageStatus::ALL.len(), 2);
    }
}
