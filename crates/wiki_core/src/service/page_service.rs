//! Page use-case service.
//!
//! # Responsibility
//! - Drive the save sequence: hooks, validation, then persistence.
//! - Provide lookup, listing, tag search and similarity APIs.
//!
//! # Invariants
//! - Nothing is written unless validation reports no violations.
//! - Store constraint failures propagate as errors, never swallowed.
//! - "No match" is an empty result, never an error.

use crate::model::page::{InvalidEnumValue, Page, PageAttributes, PageId, PageStatus};
use crate::model::tag::normalize_tag;
use crate::model::validation::{validate_page, ValidationErrors};
use crate::repo::page_repo::{
    normalize_page_limit, PageQuery, PageRepository, RepoError, RepoResult,
};
use crate::search::similarity::{rank_by_shared_tags, SimilarPage};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for page use-cases.
#[derive(Debug)]
pub enum PageServiceError {
    /// Candidate page failed validation; every violation is listed.
    Validation(ValidationErrors),
    /// Input carried a value outside a closed enumeration.
    InvalidEnumValue(InvalidEnumValue),
    /// Target page does not exist.
    PageNotFound(PageId),
    /// Persistence-layer failure, including store constraint violations.
    Repo(RepoError),
    /// Write and read-back disagree.
    InconsistentState(&'static str),
}

impl PageServiceError {
    /// Returns the violation list for validation failures.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl Display for PageServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::InvalidEnumValue(err) => write!(f, "{err}"),
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent page state: {details}"),
        }
    }
}

impl Error for PageServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::InvalidEnumValue(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PageServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::PageNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<InvalidEnumValue> for PageServiceError {
    fn from(value: InvalidEnumValue) -> Self {
        Self::InvalidEnumValue(value)
    }
}

/// List result envelope for the page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesListResult {
    /// Pages in primary key order.
    pub items: Vec<Page>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Page service facade over repository implementations.
pub struct PageService<R: PageRepository> {
    repo: R,
}

impl<R: PageRepository> PageService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds an unsaved page from untrusted attributes.
    pub fn build(&self, attributes: PageAttributes) -> Result<Page, PageServiceError> {
        Ok(Page::build(attributes)?)
    }

    /// Runs pre-validation hooks and validation on `page`.
    ///
    /// The violation list is stored on the page (`Page::errors`) and also
    /// returned inside `PageServiceError::Validation`.
    pub fn validate(&self, page: &mut Page) -> Result<(), PageServiceError> {
        page.apply_hooks();
        let errors = validate_page(page, |url_title, except| {
            self.repo.url_title_exists(url_title, except)
        })?;
        page.record_validation(errors.clone());

        if errors.is_empty() {
            return Ok(());
        }

        warn!(
            "event=page_validate module=service status=rejected error_count={} paths={}",
            errors.len(),
            errors.paths().join(",")
        );
        Err(PageServiceError::Validation(errors))
    }

    /// Validates and persists `page`, inserting or updating as needed.
    ///
    /// On success `page` is refreshed from the store (id, timestamps).
    /// On failure `page` keeps its in-memory state and nothing is written.
    pub fn save(&mut self, page: &mut Page) -> Result<(), PageServiceError> {
        let started_at = Instant::now();
        self.validate(page)?;

        let (mode, result) = match page.id() {
            Some(id) => ("update", self.repo.update_page(page).map(|()| id)),
            None => ("insert", self.repo.insert_page(page)),
        };
        let id = result.map_err(|err| {
            warn!(
                "event=page_save module=service status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            err
        })?;

        *page = self
            .repo
            .get_page(id)?
            .ok_or(PageServiceError::InconsistentState(
                "saved page not found in read-back",
            ))?;

        info!(
            "event=page_save module=service status=ok mode={mode} page_id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Builds and saves a page in one step.
    ///
    /// # Errors
    /// - `InvalidEnumValue` for an unknown `status`; nothing is written.
    /// - `Validation` when required fields are missing or taken.
    /// - `Repo` when the store rejects the row.
    pub fn create(&mut self, attributes: PageAttributes) -> Result<Page, PageServiceError> {
        let mut page = Page::build(attributes).map_err(|err| {
            warn!(
                "event=page_create module=service status=rejected field={} error_code=invalid_enum_value",
                err.field
            );
            err
        })?;
        self.save(&mut page)?;
        Ok(page)
    }

    /// Gets one page by primary key.
    pub fn get_page(&self, id: PageId) -> RepoResult<Option<Page>> {
        self.repo.get_page(id)
    }

    /// Gets one page by its url title. `None` when unknown.
    pub fn find_by_url_title(&self, url_title: &str) -> RepoResult<Option<Page>> {
        self.repo.get_page_by_url_title(url_title)
    }

    /// Lists pages in primary key order with pagination, optionally only
    /// those with `status`.
    pub fn list_pages(
        &self,
        status: Option<PageStatus>,
        limit: Option<u32>,
        offset: u32,
    ) -> RepoResult<PagesListResult> {
        let applied_limit = normalize_page_limit(limit);
        let mut query = PageQuery::new().paginate(applied_limit, offset);
        if let Some(status) = status {
            query = query.with_status(status);
        }
        let items = self.repo.list_pages(&query)?;
        Ok(PagesListResult {
            items,
            applied_limit,
        })
    }

    /// Returns every page whose tag set contains `tag`.
    ///
    /// `tag` is trimmed the same way stored tags are; the comparison itself
    /// is exact and case-sensitive.
    pub fn find_by_tag(&self, tag: &str) -> RepoResult<Vec<Page>> {
        let Some(tag) = normalize_tag(tag) else {
            return Ok(Vec::new());
        };
        let pages = self.repo.list_pages(&PageQuery::new().with_tag(tag))?;
        debug!(
            "event=page_find_by_tag module=service status=ok hits={}",
            pages.len()
        );
        Ok(pages)
    }

    /// Returns other pages sharing at least one tag with `page`, most
    /// shared tags first. `page` itself is never part of the result.
    pub fn find_similar(&self, page: &Page) -> RepoResult<Vec<SimilarPage>> {
        if page.tags().is_empty() {
            return Ok(Vec::new());
        }

        let mut query = PageQuery::new().sharing_any_tag(page.tags().iter().cloned());
        if let Some(id) = page.id() {
            query = query.excluding(id);
        }

        let candidates = self.repo.list_pages(&query)?;
        let ranked = rank_by_shared_tags(page, candidates);
        debug!(
            "event=page_find_similar module=service status=ok page_id={} hits={}",
            page.id().map_or_else(|| "unsaved".to_string(), |id| id.to_string()),
            ranked.len()
        );
        Ok(ranked)
    }

    /// Lists tags attached to at least one page.
    pub fn list_tags(&self) -> RepoResult<Vec<String>> {
        self.repo.list_tags()
    }
}
