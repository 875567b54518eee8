//! Tag-based page similarity.
//!
//! # Responsibility
//! - Rank candidate pages by tag overlap with a source page.
//!
//! # Invariants
//! - Ranking is deterministic: overlap descending, then primary key.

pub mod similarity;
