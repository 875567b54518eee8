//! Pure text transforms applied to page fields.
//!
//! # Responsibility
//! - Derive url titles from human-readable titles.
//! - Render markdown sources to HTML.
//!
//! # Invariants
//! - Every function here is deterministic and side-effect free.

pub mod markdown;
pub mod slug;
