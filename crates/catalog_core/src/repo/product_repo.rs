//! Product repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Count and page products under one shared predicate.
//! - Eager-load categories and variants for a batch of products.
//!
//! # Invariants
//! - Count and page fetch build their `WHERE` clause from the same function.
//! - Pages are ordered by product id ascending.
//! - Loading N products issues three `SELECT`s, never one per product.
//! - Money is stored as integer cents and surfaced as `Decimal`.

use super::{ensure_tables, parse_category_code, RepoError, RepoResult};
use crate::model::filter::{PageWindow, ProductPredicate};
use crate::model::product::{Category, Product, ProductId, Variant};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

const PRODUCT_SELECT_SQL: &str = "SELECT
    products.id,
    products.code,
    products.price_cents
FROM products";

/// Decimal places carried by stored prices.
const PRICE_SCALE: u32 = 2;

/// Store boundary consumed by the catalog query engine.
pub trait ProductRepository {
    /// Counts products matching `predicate`, ignoring pagination.
    fn count_matching(&self, predicate: &ProductPredicate) -> RepoResult<u64>;

    /// Fetches one id-ordered page of matching products with category and
    /// variants loaded.
    fn fetch_page(
        &self,
        predicate: &ProductPredicate,
        window: PageWindow,
    ) -> RepoResult<Vec<Product>>;

    /// Fetches one product by exact code with category and variants loaded.
    fn fetch_by_code(&self, code: &str) -> RepoResult<Option<Product>>;

    /// Fetches one product by surrogate id with category and variants loaded.
    fn fetch_by_id(&self, id: ProductId) -> RepoResult<Option<Product>>;

    /// Runs `read` against a single consistent view of the store.
    ///
    /// The default runs `read` directly, for stores without snapshot support.
    fn read_snapshot<T, F>(&self, read: F) -> RepoResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        read(self)
    }
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["products", "product_categories", "product_variants"])?;
        Ok(Self { conn })
    }

    fn query_products(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut heads = Vec::new();
        while let Some(row) = rows.next()? {
            heads.push(parse_product_row(row)?);
        }

        self.attach_relations(heads)
    }

    fn attach_relations(&self, heads: Vec<ProductHead>) -> RepoResult<Vec<Product>> {
        if heads.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ProductId> = heads.iter().map(|head| head.id).collect();
        let mut categories = load_categories(self.conn, &ids)?;
        let mut variants = load_variants(self.conn, &ids)?;

        Ok(heads
            .into_iter()
            .map(|head| Product {
                category: categories.remove(&head.id),
                variants: variants.remove(&head.id).unwrap_or_default(),
                id: head.id,
                code: head.code,
                price: head.price,
            })
            .collect())
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn count_matching(&self, predicate: &ProductPredicate) -> RepoResult<u64> {
        let (where_sql, bind_values) = predicate_where_clause(predicate);
        let sql = format!("SELECT COUNT(*) FROM products{where_sql};");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;

        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative product count `{count}`")))
    }

    fn fetch_page(
        &self,
        predicate: &ProductPredicate,
        window: PageWindow,
    ) -> RepoResult<Vec<Product>> {
        let (where_sql, mut bind_values) = predicate_where_clause(predicate);
        let sql =
            format!("{PRODUCT_SELECT_SQL}{where_sql} ORDER BY products.id ASC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(window.limit)));
        bind_values.push(Value::Integer(
            i64::try_from(window.offset).unwrap_or(i64::MAX),
        ));

        self.query_products(&sql, bind_values)
    }

    fn fetch_by_code(&self, code: &str) -> RepoResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT_SQL} WHERE products.code = ?1;");
        let products = self.query_products(&sql, vec![Value::Text(code.to_string())])?;
        Ok(products.into_iter().next())
    }

    fn fetch_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT_SQL} WHERE products.id = ?1;");
        let products = self.query_products(&sql, vec![Value::Integer(id)])?;
        Ok(products.into_iter().next())
    }

    fn read_snapshot<T, F>(&self, read: F) -> RepoResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        // Already inside a caller-owned transaction: that one is the snapshot.
        if !self.conn.is_autocommit() {
            return read(self);
        }

        let tx = self.conn.unchecked_transaction()?;
        let value = read(self)?;
        tx.commit()?;
        Ok(value)
    }
}

struct ProductHead {
    id: ProductId,
    code: String,
    price: Decimal,
}

/// Builds the `WHERE` clause and binds for `predicate`.
fn predicate_where_clause(predicate: &ProductPredicate) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(category) = predicate.category.as_ref() {
        sql.push_str(
            " AND EXISTS (
                SELECT 1
                FROM product_categories pc
                WHERE pc.product_id = products.id
                  AND pc.name = ?
            )",
        );
        bind_values.push(Value::Text(category.clone()));
    }

    if let Some(max_price) = predicate.max_price {
        sql.push_str(" AND products.price_cents < ?");
        bind_values.push(Value::Integer(price_bound_to_cents(max_price)));
    }

    (sql, bind_values)
}

fn load_categories(
    conn: &Connection,
    product_ids: &[ProductId],
) -> RepoResult<HashMap<ProductId, Category>> {
    let sql = format!(
        "SELECT id, product_id, code, name
         FROM product_categories
         WHERE product_id IN ({})
         ORDER BY id ASC;",
        placeholders(product_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(product_ids.iter()))?;
    let mut categories = HashMap::new();
    while let Some(row) = rows.next()? {
        let code_text: String = row.get("code")?;
        let category = Category {
            id: row.get("id")?,
            product_id: row.get("product_id")?,
            code: parse_category_code(&code_text)?,
            name: row.get("name")?,
        };
        // Lowest id wins when a product has several category rows.
        categories.entry(category.product_id).or_insert(category);
    }
    Ok(categories)
}

fn load_variants(
    conn: &Connection,
    product_ids: &[ProductId],
) -> RepoResult<HashMap<ProductId, Vec<Variant>>> {
    let sql = format!(
        "SELECT id, product_id, name, sku, price_cents
         FROM product_variants
         WHERE product_id IN ({})
         ORDER BY product_id ASC, id ASC;",
        placeholders(product_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(product_ids.iter()))?;
    let mut variants: HashMap<ProductId, Vec<Variant>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let variant = Variant {
            id: row.get("id")?,
            product_id: row.get("product_id")?,
            name: row.get("name")?,
            sku: row.get("sku")?,
            price: price_from_cents(row.get("price_cents")?),
        };
        variants.entry(variant.product_id).or_default().push(variant);
    }
    Ok(variants)
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<ProductHead> {
    Ok(ProductHead {
        id: row.get("id")?,
        code: row.get("code")?,
        price: price_from_cents(row.get("price_cents")?),
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Decodes stored cents into an exact decimal price.
pub fn price_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, PRICE_SCALE)
}

/// Converts an exclusive decimal bound into an exclusive cents bound.
///
/// For integer cents `c`: `c < bound * 100` exactly when `c < ceil(bound * 100)`.
/// Bounds beyond the `i64` range saturate.
fn price_bound_to_cents(bound: Decimal) -> i64 {
    let saturated = if bound.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };
    bound
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.ceil().to_i64())
        .unwrap_or(saturated)
}
