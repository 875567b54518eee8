//! Core domain logic for the wiki.
//! This crate owns page invariants: slugs, validation, rendering and
//! tag similarity.

pub mod content;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use content::markdown::render_markdown;
pub use content::slug::slugify;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::page::{
    InvalidEnumValue, Page, PageAttributes, PageId, PageLifecycle, PageStatus, ROUTE_PREFIX,
};
pub use model::tag::parse_tag_list;
pub use model::validation::{FieldError, FieldErrorKind, ValidationErrors};
pub use repo::page_repo::{
    PageQuery, PageRepository, RepoError, RepoResult, SqlitePageRepository,
};
pub use search::similarity::SimilarPage;
pub use service::page_service::{PageService, PageServiceError, PagesListResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
