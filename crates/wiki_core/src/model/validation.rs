//! Required-field validation for pages.
//!
//! # Responsibility
//! - Check a candidate page before it may become durable.
//! - Collect every violation instead of stopping at the first one.
//!
//! # Invariants
//! - Checks run in a fixed order: `title`, `urlTitle`, `content`.
//! - Error positions are stable for a given page shape, so callers may
//!   address errors by index as well as by path.

use crate::model::page::{Page, PageId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_PATH: &str = "title";
pub const URL_TITLE_PATH: &str = "urlTitle";
pub const CONTENT_PATH: &str = "content";

/// Category of one field-level violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Field is absent or blank.
    MissingRequiredField,
    /// Field value collides with another page.
    UniquenessViolation,
}

/// One field-level violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// External attribute name (`title`, `urlTitle`, `content`).
    pub path: &'static str,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn missing(path: &'static str) -> Self {
        Self {
            path,
            kind: FieldErrorKind::MissingRequiredField,
            message: format!("{path} is required"),
        }
    }

    fn taken(path: &'static str, value: &str) -> Self {
        Self {
            path,
            kind: FieldErrorKind::UniquenessViolation,
            message: format!("{path} `{value}` is already used by another page"),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Ordered list of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    items: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the violation at `index` in check order.
    pub fn get(&self, index: usize) -> Option<&FieldError> {
        self.items.get(index)
    }

    /// Returns the first violation recorded for `path`.
    pub fn by_path(&self, path: &str) -> Option<&FieldError> {
        self.items.iter().find(|item| item.path == path)
    }

    pub fn paths(&self) -> Vec<&'static str> {
        self.items.iter().map(|item| item.path).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.items.iter()
    }

    fn push(&mut self, error: FieldError) {
        self.items.push(error);
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages = self
            .items
            .iter()
            .map(|item| item.message.as_str())
            .collect::<Vec<_>>();
        write!(f, "page validation failed: {}", messages.join("; "))
    }
}

impl Error for ValidationErrors {}

/// Validates `page` and returns all violations in check order.
///
/// `url_title_taken` is the uniqueness lookup; it receives the candidate url
/// title and the page's own id (so a page never collides with itself).
/// Lookup failures abort validation and are returned unchanged.
pub fn validate_page<F, E>(page: &Page, mut url_title_taken: F) -> Result<ValidationErrors, E>
where
    F: FnMut(&str, Option<PageId>) -> Result<bool, E>,
{
    let mut errors = ValidationErrors::default();

    if page.title.trim().is_empty() {
        errors.push(FieldError::missing(TITLE_PATH));
    }

    match page.url_title().filter(|value| !value.trim().is_empty()) {
        None => errors.push(FieldError::missing(URL_TITLE_PATH)),
        Some(url_title) => {
            if url_title_taken(url_title, page.id())? {
                errors.push(FieldError::taken(URL_TITLE_PATH, url_title));
            }
        }
    }

    if page.content.trim().is_empty() {
        errors.push(FieldError::missing(CONTENT_PATH));
    }

    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::{validate_page, FieldErrorKind, CONTENT_PATH, TITLE_PATH, URL_TITLE_PATH};
    use crate::model::page::Page;
    use std::convert::Infallible;

    fn never_taken(_: &str, _: Option<i64>) -> Result<bool, Infallible> {
        Ok(false)
    }

    #[test]
    fn empty_page_reports_every_required_field_in_order() {
        let page = Page::default();
        let errors = validate_page(&page, never_taken).unwrap();
        assert_eq!(errors.paths(), vec![TITLE_PATH, URL_TITLE_PATH, CONTENT_PATH]);
        assert!(errors
            .iter()
            .all(|item| item.kind == FieldErrorKind::MissingRequiredField));
    }

    #[test]
    fn blank_title_counts_as_missing() {
        let mut page = Page::new("   ", "body");
        page.set_url_title("explicit");
        let errors = validate_page(&page, never_taken).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(0).map(|item| item.path), Some(TITLE_PATH));
    }

    #[test]
    fn taken_url_title_is_reported_at_url_title_position() {
        let mut page = Page::new("Anna", "");
        page.set_url_title("Anna");
        let errors = validate_page(&page, |_, _| Ok::<_, Infallible>(true)).unwrap();
        assert_eq!(errors.paths(), vec![URL_TITLE_PATH, CONTENT_PATH]);
        let taken = errors.by_path(URL_TITLE_PATH).unwrap();
        assert_eq!(taken.kind, FieldErrorKind::UniquenessViolation);
        assert!(taken.message.contains("Anna"));
    }

    #[test]
    fn uniqueness_lookup_failure_is_propagated() {
        let mut page = Page::new("Anna", "bar");
        page.set_url_title("Anna");
        let result = validate_page(&page, |_, _| Err::<bool, _>("store offline"));
        assert_eq!(result.unwrap_err(), "store offline");
    }

    #[test]
    fn complete_page_has_no_errors() {
        let mut page = Page::new("Anna", "bar");
        page.apply_hooks();
        let errors = validate_page(&page, never_taken).unwrap();
        assert!(errors.is_empty());
    }
}
