//! Category repository contract and SQLite implementation.
//!
//! # Invariants
//! - Category codes are stored as hyphenated UUID text.
//! - `create_category` returns the row it inserted, read back by rowid.

use super::{ensure_tables, parse_category_code, RepoError, RepoResult};
use crate::model::product::{Category, CategoryId, ProductId};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    product_id,
    code,
    name
FROM product_categories";

/// Insert payload for a new category row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub product_id: ProductId,
    pub code: Uuid,
    pub name: String,
}

/// Repository interface for category reads and inserts.
pub trait CategoryRepository {
    /// Lists every category ordered by id.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Inserts one category and returns the stored row.
    fn create_category(&self, category: &NewCategory) -> RepoResult<Category>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["products", "product_categories"])?;
        Ok(Self { conn })
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn create_category(&self, category: &NewCategory) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT INTO product_categories (product_id, code, name)
             VALUES (?1, ?2, ?3);",
            params![
                category.product_id,
                category.code.to_string(),
                category.name.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_category(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted category {id} not found in read-back"))
        })
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let code_text: String = row.get("code")?;
    Ok(Category {
        id: row.get("id")?,
        product_id: row.get("product_id")?,
        code: parse_category_code(&code_text)?,
        name: row.get("name")?,
    })
}
