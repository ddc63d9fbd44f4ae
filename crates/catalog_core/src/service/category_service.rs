//! Category use-case service.
//!
//! # Responsibility
//! - List categories.
//! - Create a category for an existing product with a generated code.
//!
//! # Invariants
//! - A product never gets two categories whose names differ only by case.
//! - Categories are only created for products that exist.

use crate::model::product::{Category, ProductId};
use crate::repo::category_repo::{CategoryRepository, NewCategory};
use crate::repo::product_repo::ProductRepository;
use crate::repo::RepoError;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from category use-cases.
#[derive(Debug)]
pub enum CategoryServiceError {
    /// Name is blank after trim.
    InvalidName,
    /// The product already has a category with this name (case-insensitive).
    DuplicateName { product_id: ProductId, name: String },
    /// Target product does not exist.
    ProductNotFound(ProductId),
    /// Persistence-layer failure.
    Store(RepoError),
}

impl Display for CategoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "category name must not be blank"),
            Self::DuplicateName { product_id, name } => write!(
                f,
                "product {product_id} already has a category named `{name}`"
            ),
            Self::ProductNotFound(id) => write!(f, "product not found: id {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CategoryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Category row as shown to clients of the category workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRecordView {
    pub id: i64,
    pub product_id: ProductId,
    pub code: Uuid,
    pub name: String,
}

impl From<Category> for CategoryRecordView {
    fn from(value: Category) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            code: value.code,
            name: value.name,
        }
    }
}

/// Category service facade over category and product repositories.
pub struct CategoryService<C: CategoryRepository, P: ProductRepository> {
    categories: C,
    products: P,
}

impl<C: CategoryRepository, P: ProductRepository> CategoryService<C, P> {
    pub fn new(categories: C, products: P) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Lists all categories ordered by id.
    pub fn list_categories(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.categories.list_categories()?)
    }

    /// Creates a category named `name` for `product_id`.
    ///
    /// # Contract
    /// - `name` is trimmed; blank names are rejected.
    /// - Duplicate check runs before the product existence check.
    /// - The stored category receives a fresh random UUID code.
    pub fn create_category(
        &self,
        product_id: ProductId,
        name: &str,
    ) -> Result<Category, CategoryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::InvalidName);
        }

        let folded = name.to_lowercase();
        let duplicate = self
            .categories
            .list_categories()?
            .iter()
            .any(|existing| {
                existing.product_id == product_id && existing.name.to_lowercase() == folded
            });
        if duplicate {
            warn!(
                "event=category_create module=service status=error error_code=duplicate_name product_id={product_id}"
            );
            return Err(CategoryServiceError::DuplicateName {
                product_id,
                name: name.to_string(),
            });
        }

        if self.products.fetch_by_id(product_id)?.is_none() {
            warn!(
                "event=category_create module=service status=error error_code=product_not_found product_id={product_id}"
            );
            return Err(CategoryServiceError::ProductNotFound(product_id));
        }

        let created = self.categories.create_category(&NewCategory {
            product_id,
            code: Uuid::new_v4(),
            name: name.to_string(),
        })?;
        info!(
            "event=category_create module=service status=ok product_id={} category_id={}",
            created.product_id, created.id
        );
        Ok(created)
    }
}
