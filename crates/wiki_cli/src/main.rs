//! Command-line front end for the wiki core.
//!
//! # Responsibility
//! - Map subcommands onto `PageService` operations against a SQLite file.
//! - Print pages as JSON; report failures on stderr with stable exit codes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::process::ExitCode;
use wiki_core::db::open_db;
use wiki_core::{
    init_logging, parse_tag_list, LogLevel, Page, PageAttributes, PageService, PageServiceError,
    PageStatus, SimilarPage, SqlitePageRepository,
};

const EXIT_VALIDATION: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "wiki", version, about = "Manage wiki pages stored in SQLite")]
struct Cli {
    /// Page database file.
    #[arg(long, env = "WIKI_DB", default_value = "wiki.db", global = true)]
    db: String,

    /// Log level (trace|debug|info|warn|error); needs a log directory.
    #[arg(
        long,
        env = "WIKI_LOG_LEVEL",
        global = true,
        requires = "log_dir",
        value_parser = parse_log_level
    )]
    log_level: Option<LogLevel>,

    /// Absolute directory for rotating log files; logging is off when unset.
    #[arg(long, env = "WIKI_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage information.
    Version,
    /// Create a page.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Comma or space separated tags.
        #[arg(long, default_value = "")]
        tags: String,
        /// open|closed
        #[arg(long)]
        status: Option<String>,
        /// Explicit url title; derived from the title when omitted.
        #[arg(long)]
        url_title: Option<String>,
    },
    /// Show one page by url title.
    Show {
        url_title: String,
        /// Print rendered HTML instead of JSON.
        #[arg(long)]
        html: bool,
    },
    /// List pages.
    List {
        /// Only pages with this status (open|closed).
        #[arg(long)]
        status: Option<PageStatus>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Find pages carrying a tag.
    Search { tag: String },
    /// Find pages sharing tags with a page, most shared first.
    Similar { url_title: String },
    /// List tags in use.
    Tags,
}

/// Failure that maps to a specific exit code.
#[derive(Debug)]
enum Outcome {
    NotFound(String),
    Rejected(PageServiceError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(Outcome::NotFound(url_title))) => {
            eprintln!("page not found: {url_title}");
            ExitCode::from(EXIT_NOT_FOUND)
        }
        Ok(Some(Outcome::Rejected(err))) => {
            match err.validation_errors() {
                Some(errors) => {
                    for item in errors {
                        eprintln!("{item}");
                    }
                }
                None => eprintln!("{err}"),
            }
            ExitCode::from(EXIT_VALIDATION)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Option<Outcome>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.unwrap_or_else(wiki_core::default_log_level);
        init_logging(level.as_str(), log_dir).context("failed to initialize logging")?;
    }

    if let Command::Version = cli.command {
        println!("wiki_core ping={}", wiki_core::ping());
        println!("wiki_core version={}", wiki_core::core_version());
        return Ok(None);
    }

    let mut conn = open_db(&cli.db).with_context(|| format!("failed to open `{}`", cli.db))?;
    let repo = SqlitePageRepository::try_new(&mut conn)?;
    let mut service = PageService::new(repo);

    match cli.command {
        Command::Version => {}
        Command::Add {
            title,
            content,
            tags,
            status,
            url_title,
        } => {
            let attributes = PageAttributes {
                title: Some(title),
                url_title,
                content: Some(content),
                tags: parse_tag_list(&tags),
                status,
            };
            match service.create(attributes) {
                Ok(page) => print_json(&page_json(&page))?,
                Err(err @ PageServiceError::Repo(_)) => return Err(err.into()),
                Err(err) => return Ok(Some(Outcome::Rejected(err))),
            }
        }
        Command::Show { url_title, html } => {
            let Some(page) = service.find_by_url_title(&url_title)? else {
                return Ok(Some(Outcome::NotFound(url_title)));
            };
            if html {
                print!("{}", page.rendered_content());
            } else {
                print_json(&page_json(&page))?;
            }
        }
        Command::List {
            status,
            limit,
            offset,
        } => {
            let listed = service.list_pages(status, limit, offset)?;
            let items = listed.items.iter().map(page_json).collect::<Vec<_>>();
            print_json(&json!({ "items": items, "appliedLimit": listed.applied_limit }))?;
        }
        Command::Search { tag } => {
            let pages = service.find_by_tag(&tag)?;
            print_json(&Value::Array(pages.iter().map(page_json).collect()))?;
        }
        Command::Similar { url_title } => {
            let Some(page) = service.find_by_url_title(&url_title)? else {
                return Ok(Some(Outcome::NotFound(url_title)));
            };
            let similar = service.find_similar(&page)?;
            print_json(&Value::Array(similar.iter().map(similar_json).collect()))?;
        }
        Command::Tags => {
            print_json(&json!(service.list_tags()?))?;
        }
    }

    Ok(None)
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    value.parse().map_err(|err: wiki_core::LoggingError| err.to_string())
}

fn page_json(page: &Page) -> Value {
    let mut value = json!(page);
    if let Value::Object(fields) = &mut value {
        fields.insert("route".to_string(), json!(page.route()));
    }
    value
}

fn similar_json(item: &SimilarPage) -> Value {
    json!({
        "sharedTags": item.shared_tags,
        "page": page_json(&item.page),
    })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
