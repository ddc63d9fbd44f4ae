//! Product catalog core.
//!
//! Turns untrusted list parameters into bounded filters, runs consistent
//! count + page queries against SQLite with eager-loaded relations, and
//! resolves variant prices for presentation.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::filter::{
    PageWindow, ProductFilter, ProductPredicate, RawProductQuery, DEFAULT_LIMIT, MAX_LIMIT,
    MIN_LIMIT,
};
pub use model::product::{Category, CategoryId, Product, ProductId, Variant, VariantId};
pub use repo::category_repo::{CategoryRepository, NewCategory, SqliteCategoryRepository};
pub use repo::product_repo::{ProductRepository, SqliteProductRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{
    CatalogError, CatalogListing, CatalogResult, CatalogService, CategoryView, ProductDetail,
    ProductLookup, ProductPage, ProductSummary, VariantView,
};
pub use service::category_service::{CategoryRecordView, CategoryService, CategoryServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
