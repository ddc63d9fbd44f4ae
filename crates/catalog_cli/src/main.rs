//! Command-line front end for the catalog core.
//!
//! # Responsibility
//! - Parse process configuration from flags and environment.
//! - Run one catalog use-case and print its result as JSON.

use anyhow::{anyhow, Context, Result};
use catalog_core::db::open_db;
use catalog_core::{
    default_log_level, init_logging, CatalogService, CategoryRecordView, CategoryService,
    ProductId, RawProductQuery, SqliteCategoryRepository, SqliteProductRepository,
};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Query a product catalog database")]
struct Cli {
    /// SQLite catalog database file
    #[arg(long, env = "CATALOG_DB_PATH")]
    db: PathBuf,
    /// Log level: trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "CATALOG_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rotated log files; logging is off when unset
    #[arg(long, env = "CATALOG_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// List products, e.g. `list category=Shoes priceLessThan=150 limit=20`
    List {
        /// Query parameters as key=value (offset, limit, category, priceLessThan)
        #[arg(value_parser = parse_query_pair)]
        params: Vec<(String, String)>,
    },
    /// Show one product with its variants
    Show {
        /// Product code
        code: String,
    },
    /// List all categories
    Categories,
    /// Create a category for an existing product
    AddCategory {
        #[arg(long)]
        product_id: ProductId,
        #[arg(long)]
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)
            .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;
    }
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        catalog_core::core_version()
    );

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open catalog `{}`", cli.db.display()))?;

    match cli.command {
        Commands::List { params } => {
            let service = CatalogService::new(SqliteProductRepository::try_new(&conn)?);
            let listing = service.list_catalog(&RawProductQuery::from_pairs(params))?;
            print_json(&listing)
        }
        Commands::Show { code } => {
            let service = CatalogService::new(SqliteProductRepository::try_new(&conn)?);
            let detail = service.product_detail(&code)?;
            print_json(&detail)
        }
        Commands::Categories => {
            let service = CategoryService::new(
                SqliteCategoryRepository::try_new(&conn)?,
                SqliteProductRepository::try_new(&conn)?,
            );
            let categories: Vec<CategoryRecordView> = service
                .list_categories()?
                .into_iter()
                .map(CategoryRecordView::from)
                .collect();
            print_json(&categories)
        }
        Commands::AddCategory { product_id, name } => {
            let service = CategoryService::new(
                SqliteCategoryRepository::try_new(&conn)?,
                SqliteProductRepository::try_new(&conn)?,
            );
            let created = service.create_category(product_id, &name)?;
            print_json(&CategoryRecordView::from(created))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode result")?;
    println!("{rendered}");
    Ok(())
}

/// Splits `key=value`; a bare `key` carries an empty value.
fn parse_query_pair(input: &str) -> Result<(String, String), String> {
    let (key, value) = input.split_once('=').unwrap_or((input, ""));
    if key.is_empty() {
        return Err(format!("expected key=value, got `{input}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
