mod common;

use catalog_core::db::open_db_in_memory;
use catalog_core::{
    CatalogService, CategoryRecordView, CategoryService, CategoryServiceError, RawProductQuery,
    SqliteCategoryRepository, SqliteProductRepository,
};
use common::{insert_category, insert_product};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> CategoryService<SqliteCategoryRepository<'_>, SqliteProductRepository<'_>> {
    CategoryService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteProductRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn create_category_generates_code_and_reads_back_row() {
    let conn = open_db_in_memory().unwrap();
    let product_id = insert_product(&conn, "PROD001", 10_00);
    let service = service(&conn);

    let created = service.create_category(product_id, "  Shoes ").unwrap();
    assert_eq!(created.product_id, product_id);
    assert_eq!(created.name, "Shoes");
    assert!(!created.code.is_nil());

    let listed = service.list_categories().unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn created_category_is_usable_as_list_filter() {
    let conn = open_db_in_memory().unwrap();
    let product_id = insert_product(&conn, "PROD001", 10_00);
    insert_product(&conn, "PROD002", 10_00);
    service(&conn).create_category(product_id, "Hats").unwrap();

    let catalog = CatalogService::new(SqliteProductRepository::try_new(&conn).unwrap());
    let listing = catalog
        .list_catalog(&RawProductQuery {
            category: Some("Hats".to_string()),
            ..RawProductQuery::default()
        })
        .unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.products[0].code, "PROD001");
}

#[test]
fn duplicate_name_is_rejected_case_insensitively_per_product() {
    let conn = open_db_in_memory().unwrap();
    let first = insert_product(&conn, "PROD001", 10_00);
    let second = insert_product(&conn, "PROD002", 10_00);
    insert_category(&conn, first, "Shoes");
    let service = service(&conn);

    let err = service.create_category(first, "SHOES").unwrap_err();
    assert!(matches!(
        err,
        CategoryServiceError::DuplicateName { product_id, .. } if product_id == first
    ));

    let other = service.create_category(second, "Shoes").unwrap();
    assert_eq!(other.product_id, second);
}

#[test]
fn duplicate_check_runs_before_product_lookup() {
    let conn = open_db_in_memory().unwrap();
    let id = insert_product(&conn, "PROD001", 10_00);
    insert_category(&conn, id, "Shoes");
    conn.execute_batch("PRAGMA foreign_keys = OFF; DELETE FROM products;")
        .unwrap();

    let err = service(&conn).create_category(id, "shoes").unwrap_err();
    assert!(matches!(err, CategoryServiceError::DuplicateName { .. }));
}

#[test]
fn unknown_product_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn).create_category(77, "Shoes").unwrap_err();
    assert!(matches!(err, CategoryServiceError::ProductNotFound(77)));
}

#[test]
fn blank_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let id = insert_product(&conn, "PROD001", 10_00);
    let err = service(&conn).create_category(id, "   ").unwrap_err();
    assert!(matches!(err, CategoryServiceError::InvalidName));
}

#[test]
fn record_view_serializes_code_as_uuid_string() {
    let conn = open_db_in_memory().unwrap();
    let id = insert_product(&conn, "PROD001", 10_00);
    let code = insert_category(&conn, id, "Shoes");

    let categories = service(&conn).list_categories().unwrap();
    let views: Vec<CategoryRecordView> = categories
        .into_iter()
        .map(CategoryRecordView::from)
        .collect();
    let json = serde_json::to_value(&views).unwrap();
    assert_eq!(json[0]["code"], code.to_string());
    assert_eq!(json[0]["product_id"], id);
    assert_eq!(json[0]["name"], "Shoes");
}

#[test]
fn corrupt_category_code_surfaces_as_store_error() {
    let conn = open_db_in_memory().unwrap();
    let id = insert_product(&conn, "PROD001", 10_00);
    conn.execute(
        "INSERT INTO product_categories (product_id, code, name) VALUES (?1, 'not-a-uuid', 'X');",
        [id],
    )
    .unwrap();

    let err = service(&conn).list_categories().unwrap_err();
    assert!(matches!(err, CategoryServiceError::Store(_)));
}
