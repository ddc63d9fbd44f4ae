//! Catalog query engine.
//!
//! # Responsibility
//! - List products for a normalized filter with a consistent total count.
//! - Resolve product detail by code or id.
//! - Apply the variant price-fallback rule to everything it returns.
//!
//! # Invariants
//! - `total` and the page come from one predicate value and one snapshot.
//! - No page fetch is issued when `offset >= total`.
//! - Price fallback only touches returned copies, never storage.

use crate::model::filter::{ProductFilter, RawProductQuery};
use crate::model::product::{Category, Product, ProductId, Variant};
use crate::repo::product_repo::ProductRepository;
use crate::repo::RepoError;
use log::{debug, error, info};
use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Key used for a single-product lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductLookup {
    Code(String),
    Id(ProductId),
}

impl Display for ProductLookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "code `{code}`"),
            Self::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// Errors from catalog query operations.
#[derive(Debug)]
pub enum CatalogError {
    /// Detail lookup was asked for a blank product code.
    MissingCode,
    /// No product matches the lookup key.
    ProductNotFound(ProductLookup),
    /// Store failed or is unreachable. Not retried here.
    Store(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCode => write!(f, "product code is required"),
            Self::ProductNotFound(lookup) => write!(f, "product not found: {lookup}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// One page of products plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    /// Products ordered by id ascending, variant prices resolved.
    pub products: Vec<Product>,
    /// Products matching the filter regardless of offset/limit.
    pub total: u64,
}

/// Category as shown to catalog clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub code: Uuid,
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(value: &Category) -> Self {
        Self {
            code: value.code,
            name: value.name.clone(),
        }
    }
}

/// List item shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: Option<CategoryView>,
}

impl From<&Product> for ProductSummary {
    fn from(value: &Product) -> Self {
        Self {
            code: value.code.clone(),
            price: value.price,
            category: value.category.as_ref().map(CategoryView::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantView {
    pub id: i64,
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<Variant> for VariantView {
    fn from(value: Variant) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            name: value.name,
            sku: value.sku,
            price: value.price,
        }
    }
}

/// Detail shape, variants already price-resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: Option<CategoryView>,
    pub variants: Vec<VariantView>,
}

impl From<Product> for ProductDetail {
    fn from(value: Product) -> Self {
        let category = value.category.as_ref().map(CategoryView::from);
        Self {
            code: value.code,
            price: value.price,
            category,
            variants: value.variants.into_iter().map(VariantView::from).collect(),
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogListing {
    pub products: Vec<ProductSummary>,
    pub total: u64,
}

/// Stateless query engine over a product repository.
pub struct CatalogService<R: ProductRepository> {
    repo: R,
}

impl<R: ProductRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists one page of products matching `filter` with its total count.
    ///
    /// # Contract
    /// - Count and fetch share one predicate and run in one store snapshot.
    /// - `offset >= total` returns an empty page without fetching.
    /// - Returned variants have the price-fallback rule applied.
    pub fn list_products(&self, filter: &ProductFilter) -> CatalogResult<ProductPage> {
        let started_at = Instant::now();
        let predicate = filter.predicate();
        let window = filter.window();

        let result = self.repo.read_snapshot(|repo| {
            let total = repo.count_matching(&predicate)?;
            if window.offset >= total {
                debug!(
                    "event=catalog_list module=service status=skip reason=offset_beyond_total offset={} total={}",
                    window.offset, total
                );
                return Ok(ProductPage {
                    products: Vec::new(),
                    total,
                });
            }

            let products = repo
                .fetch_page(&predicate, window)?
                .into_iter()
                .map(Product::with_inherited_variant_prices)
                .collect();
            Ok(ProductPage { products, total })
        });

        match result {
            Ok(page) => {
                info!(
                    "event=catalog_list module=service status=ok offset={} limit={} has_category={} has_price_bound={} total={} returned={} duration_ms={}",
                    window.offset,
                    window.limit,
                    predicate.category.is_some(),
                    predicate.max_price.is_some(),
                    page.total,
                    page.products.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(page)
            }
            Err(err) => {
                error!(
                    "event=catalog_list module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Normalizes raw parameters, lists products and shapes the listing.
    pub fn list_catalog(&self, raw: &RawProductQuery) -> CatalogResult<CatalogListing> {
        let filter = ProductFilter::normalize(raw);
        let page = self.list_products(&filter)?;
        Ok(CatalogListing {
            products: page.products.iter().map(ProductSummary::from).collect(),
            total: page.total,
        })
    }

    /// Gets one product by exact code with relations loaded and variant
    /// prices resolved.
    pub fn get_product_by_code(&self, code: &str) -> CatalogResult<Product> {
        match self.repo.fetch_by_code(code)? {
            Some(product) => Ok(product.with_inherited_variant_prices()),
            None => Err(CatalogError::ProductNotFound(ProductLookup::Code(
                code.to_string(),
            ))),
        }
    }

    /// Gets one product by surrogate id with relations loaded and variant
    /// prices resolved.
    pub fn get_product_by_id(&self, id: ProductId) -> CatalogResult<Product> {
        match self.repo.fetch_by_id(id)? {
            Some(product) => Ok(product.with_inherited_variant_prices()),
            None => Err(CatalogError::ProductNotFound(ProductLookup::Id(id))),
        }
    }

    /// Gets the detail view for one product code.
    ///
    /// Returns `MissingCode` for a blank code before touching the store.
    pub fn product_detail(&self, code: &str) -> CatalogResult<ProductDetail> {
        if code.trim().is_empty() {
            return Err(CatalogError::MissingCode);
        }

        let started_at = Instant::now();
        let product = self.get_product_by_code(code)?;
        info!(
            "event=catalog_detail module=service status=ok variants={} duration_ms={}",
            product.variants.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ProductDetail::from(product))
    }
}
