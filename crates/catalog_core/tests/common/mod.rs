#![allow(dead_code)]

use catalog_core::{PageWindow, Product, ProductId, ProductPredicate, ProductRepository, RepoResult};
use rusqlite::{params, Connection};
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

pub fn insert_product(conn: &Connection, code: &str, price_cents: i64) -> ProductId {
    conn.execute(
        "INSERT INTO products (code, price_cents) VALUES (?1, ?2);",
        params![code, price_cents],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_category(conn: &Connection, product_id: ProductId, name: &str) -> Uuid {
    let code = Uuid::new_v4();
    conn.execute(
        "INSERT INTO product_categories (product_id, code, name) VALUES (?1, ?2, ?3);",
        params![product_id, code.to_string(), name],
    )
    .unwrap();
    code
}

pub fn insert_variant(
    conn: &Connection,
    product_id: ProductId,
    name: &str,
    sku: &str,
    price_cents: i64,
) -> i64 {
    conn.execute(
        "INSERT INTO product_variants (product_id, name, sku, price_cents)
         VALUES (?1, ?2, ?3, ?4);",
        params![product_id, name, sku, price_cents],
    )
    .unwrap();
    conn.last_insert_rowid()
}

/// Inserts `count` products `PROD001..` in one category with one own-priced
/// and one inheriting variant each.
pub fn seed_products(conn: &Connection, count: usize, category: &str) -> Vec<ProductId> {
    (1..=count)
        .map(|idx| {
            let code = format!("PROD{idx:03}");
            let id = insert_product(conn, &code, 1_000 + idx as i64);
            insert_category(conn, id, category);
            insert_variant(conn, id, "Own price", &format!("{code}-A"), 500);
            insert_variant(conn, id, "Inherited", &format!("{code}-B"), 0);
            id
        })
        .collect()
}

pub fn codes(products: &[Product]) -> Vec<String> {
    products.iter().map(|product| product.code.clone()).collect()
}

/// Call counters shared between a test and a `CountingRepository`.
#[derive(Debug, Default, Clone)]
pub struct CallCounts {
    pub counts: Rc<Cell<usize>>,
    pub pages: Rc<Cell<usize>>,
    pub snapshots: Rc<Cell<usize>>,
}

/// Delegating repository that records how often each read runs.
///
/// Snapshots are forwarded to the wrapped repository, so reads issued inside
/// `read_snapshot` still share its transaction.
pub struct CountingRepository<R> {
    inner: R,
    calls: CallCounts,
}

impl<R> CountingRepository<R> {
    pub fn new(inner: R, calls: CallCounts) -> Self {
        Self { inner, calls }
    }
}

impl<R: ProductRepository> ProductRepository for CountingRepository<R> {
    fn count_matching(&self, predicate: &ProductPredicate) -> RepoResult<u64> {
        self.calls.counts.set(self.calls.counts.get() + 1);
        self.inner.count_matching(predicate)
    }

    fn fetch_page(
        &self,
        predicate: &ProductPredicate,
        window: PageWindow,
    ) -> RepoResult<Vec<Product>> {
        self.calls.pages.set(self.calls.pages.get() + 1);
        self.inner.fetch_page(predicate, window)
    }

    fn fetch_by_code(&self, code: &str) -> RepoResult<Option<Product>> {
        self.inner.fetch_by_code(code)
    }

    fn fetch_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.inner.fetch_by_id(id)
    }

    fn read_snapshot<T, F>(&self, read: F) -> RepoResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        self.calls.snapshots.set(self.calls.snapshots.get() + 1);
        self.inner.read_snapshot(|_| read(self))
    }
}
