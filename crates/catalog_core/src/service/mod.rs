//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into list/detail/category use-cases.
//! - Shape results into serializable views for the outer layer.
//!
//! # Invariants
//! - Services stay storage-agnostic; SQL lives in `repo`.
//! - Services hold no mutable state between calls.

pub mod catalog_service;
pub mod category_service;
