//! Page persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the storage-agnostic `PageRepository` contract.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`,
//!   `UniquenessViolation`) in addition to transport errors.

pub mod page_repo;
