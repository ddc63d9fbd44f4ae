//! Catalog domain model.
//!
//! # Responsibility
//! - Define the product/category/variant records read from storage.
//! - Define the canonical list filter and its normalization from raw input.
//!
//! # Invariants
//! - Prices are exact decimals, never floating point.
//! - A zero variant price means "inherit the product price" and is only
//!   resolved on presentation copies.

pub mod filter;
pub mod product;
