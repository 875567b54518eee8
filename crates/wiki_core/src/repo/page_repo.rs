//! Page repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist pages and their tag links.
//! - Expose a small query builder (`PageQuery`) so tag matching and
//!   self-exclusion run inside the store.
//! - Translate store constraint failures into semantic errors.
//!
//! # Invariants
//! - A page row and its tag links are written in one transaction.
//! - Store uniqueness failures surface as `UniquenessViolation`, never as
//!   silent success.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Tag matching is exact and case-sensitive.

use crate::db::DbError;
use crate::model::page::{Page, PageId, PageStatus, StoredPage};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PAGE_SELECT_SQL: &str = "SELECT
    id,
    title,
    url_title,
    content,
    status,
    created_at,
    updated_at
FROM pages";

const PAGES_DEFAULT_LIMIT: u32 = 50;
const PAGES_LIMIT_MAX: u32 = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for page persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(PageId),
    /// A unique column already holds `value`.
    UniquenessViolation {
        field: &'static str,
        value: String,
    },
    /// Store rejected the row through a `CHECK` or `NOT NULL` rule.
    ConstraintViolation(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "page not found: {id}"),
            Self::UniquenessViolation { field, value } => {
                write!(f, "{field} `{value}` is already used by another page")
            }
            Self::ConstraintViolation(message) => {
                write!(f, "page rejected by store constraint: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted page data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Composable page filter.
///
/// Filters combine with AND. An empty `any_of_tags` applies no tag filter.
/// Results are always ordered by primary key ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Pages whose tag set contains this tag.
    pub tag: Option<String>,
    /// Pages sharing at least one of these tags.
    pub any_of_tags: Vec<String>,
    /// Every page except this one.
    pub exclude: Option<PageId>,
    pub status: Option<PageStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn sharing_any_tag<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any_of_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluding(mut self, id: PageId) -> Self {
        self.exclude = Some(id);
        self
    }

    pub fn with_status(mut self, status: PageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }
}

/// Repository interface for page persistence.
pub trait PageRepository {
    /// Inserts a new page with its tags and returns the generated key.
    fn insert_page(&mut self, page: &Page) -> RepoResult<PageId>;
    /// Rewrites an existing page row and replaces its tag set.
    fn update_page(&mut self, page: &Page) -> RepoResult<()>;
    fn get_page(&self, id: PageId) -> RepoResult<Option<Page>>;
    fn get_page_by_url_title(&self, url_title: &str) -> RepoResult<Option<Page>>;
    /// Whether another page (not `except`) already uses `url_title`.
    fn url_title_exists(&self, url_title: &str, except: Option<PageId>) -> RepoResult<bool>;
    fn list_pages(&self, query: &PageQuery) -> RepoResult<Vec<Page>>;
    /// Tags attached to at least one page, sorted.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed page repository.
pub struct SqlitePageRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePageRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the page schema.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_page_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PageRepository for SqlitePageRepository<'_> {
    fn insert_page(&mut self, page: &Page) -> RepoResult<PageId> {
        let url_title = require_url_title(page)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO pages (title, url_title, content, status)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                page.title.as_str(),
                url_title,
                page.content.as_str(),
                page.status.as_str(),
            ],
        )
        .map_err(|err| map_write_error(err, url_title))?;

        let id = tx.last_insert_rowid();
        replace_tags_in_tx(&tx, id, page.tags())?;
        tx.commit()?;
        Ok(id)
    }

    fn update_page(&mut self, page: &Page) -> RepoResult<()> {
        let Some(id) = page.id() else {
            return Err(RepoError::InvalidData(
                "cannot update a page that was never inserted".to_string(),
            ));
        };
        let url_title = require_url_title(page)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx
            .execute(
                "UPDATE pages
                 SET
                    title = ?2,
                    url_title = ?3,
                    content = ?4,
                    status = ?5,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    id,
                    page.title.as_str(),
                    url_title,
                    page.content.as_str(),
                    page.status.as_str(),
                ],
            )
            .map_err(|err| map_write_error(err, url_title))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        replace_tags_in_tx(&tx, id, page.tags())?;
        tx.commit()?;
        Ok(())
    }

    fn get_page(&self, id: PageId) -> RepoResult<Option<Page>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAGE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_page_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn get_page_by_url_title(&self, url_title: &str) -> RepoResult<Option<Page>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAGE_SELECT_SQL} WHERE url_title = ?1;"))?;
        let mut rows = stmt.query([url_title])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_page_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn url_title_exists(&self, url_title: &str, except: Option<PageId>) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM pages
                WHERE url_title = ?1
                  AND (?2 IS NULL OR id <> ?2)
            );",
            params![url_title, except],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_pages(&self, query: &PageQuery) -> RepoResult<Vec<Page>> {
        let mut sql = format!("{PAGE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(tag) = query.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM page_tags pt
                    INNER JOIN tags t ON t.id = pt.tag_id
                    WHERE pt.page_id = pages.id
                      AND t.name = ?
                )",
            );
            bind_values.push(Value::Text(tag.clone()));
        }

        if !query.any_of_tags.is_empty() {
            let placeholders = vec!["?"; query.any_of_tags.len()].join(", ");
            sql.push_str(&format!(
                " AND EXISTS (
                    SELECT 1
                    FROM page_tags pt
                    INNER JOIN tags t ON t.id = pt.tag_id
                    WHERE pt.page_id = pages.id
                      AND t.name IN ({placeholders})
                )"
            ));
            bind_values.extend(query.any_of_tags.iter().cloned().map(Value::Text));
        }

        if let Some(id) = query.exclude {
            sql.push_str(" AND id <> ?");
            bind_values.push(Value::Integer(id));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(self.conn, row)?);
        }

        Ok(pages)
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT t.name
             FROM tags t
             INNER JOIN page_tags pt ON pt.tag_id = t.id
             ORDER BY t.name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags: Vec<String> = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get("name")?);
        }
        Ok(tags)
    }
}

/// Normalizes a list limit: `None`/`0` → 50, capped at 500.
pub fn normalize_page_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => PAGES_DEFAULT_LIMIT,
        Some(value) if value > PAGES_LIMIT_MAX => PAGES_LIMIT_MAX,
        Some(value) => value,
    }
}

fn require_url_title(page: &Page) -> RepoResult<&str> {
    page.url_title()
        .ok_or_else(|| RepoError::InvalidData("page has no url_title".to_string()))
}

fn map_write_error(err: rusqlite::Error, url_title: &str) -> RepoError {
    if let rusqlite::Error::SqliteFailure(code, message) = &err {
        match code.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => {
                return RepoError::UniquenessViolation {
                    field: "url_title",
                    value: url_title.to_string(),
                };
            }
            ffi::SQLITE_CONSTRAINT_CHECK | ffi::SQLITE_CONSTRAINT_NOTNULL => {
                return RepoError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| code.to_string()),
                );
            }
            _ => {}
        }
    }
    err.into()
}

fn replace_tags_in_tx(tx: &Transaction<'_>, page_id: PageId, tags: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM page_tags WHERE page_id = ?1;", [page_id])?;

    for tag in tags {
        tx.execute(
            "INSERT OR IGNORE INTO tags (name) VALUES (?1);",
            [tag.as_str()],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO page_tags (page_id, tag_id)
             SELECT ?1, id
             FROM tags
             WHERE name = ?2;",
            params![page_id, tag.as_str()],
        )?;
    }

    Ok(())
}

fn parse_page_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Page> {
    let id: PageId = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = status_text.parse::<PageStatus>().map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in pages.status"))
    })?;

    Ok(Page::from(StoredPage {
        id,
        title: row.get("title")?,
        url_title: row.get("url_title")?,
        content: row.get("content")?,
        tags: load_tags_for_page(conn, id)?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    }))
}

fn load_tags_for_page(conn: &Connection, page_id: PageId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM page_tags pt
         INNER JOIN tags t ON t.id = pt.tag_id
         WHERE pt.page_id = ?1
         ORDER BY t.name ASC;",
    )?;
    let mut rows = stmt.query([page_id])?;
    let mut tags: Vec<String> = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn ensure_page_connection_ready(conn: &Connection) -> RepoResult<()> {
    const REQUIRED: &[(&str, &[&str])] = &[
        (
            "pages",
            &["id", "title", "url_title", "content", "status", "created_at", "updated_at"],
        ),
        ("tags", &["id", "name"]),
        ("page_tags", &["page_id", "tag_id"]),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
