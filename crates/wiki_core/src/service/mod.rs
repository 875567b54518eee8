//! Page use-case services.
//!
//! # Responsibility
//! - Orchestrate hooks, validation, repository calls and ranking into the
//!   operations a routing layer consumes.
//! - Keep callers decoupled from storage details.

pub mod page_service;
