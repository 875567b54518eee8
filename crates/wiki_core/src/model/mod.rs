//! Wiki page domain model.
//!
//! # Responsibility
//! - Define the canonical page record, its status enumeration and the
//!   untrusted attribute shape that external input arrives in.
//! - Own required-field validation and tag set normalization.
//!
//! # Invariants
//! - Every persisted page is identified by a store-assigned `PageId`.
//! - `status` is a closed enumeration; free text is checked at the
//!   `PageAttributes` boundary only.

pub mod page;
pub mod tag;
pub mod validation;
