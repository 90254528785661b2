//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for lookbooks, hotspots, products and the
//! facet vocabulary.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            original_price INTEGER,
            image_url TEXT,
            slug TEXT NOT NULL UNIQUE,
            category_id TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shop_looks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT UNIQUE,
            category_id TEXT NOT NULL,
            image_url TEXT NOT NULL,
            gallery_urls TEXT NOT NULL DEFAULT '[]',
            style TEXT,
            material TEXT,
            color TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            display_order INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    // product_id is not a foreign key: deleted products leave their hotspots
    // behind and the storefront renders them without a product.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shop_look_items (
            id TEXT PRIMARY KEY,
            look_id TEXT NOT NULL REFERENCES shop_looks(id) ON DELETE CASCADE,
            product_id TEXT NOT NULL,
            x_position REAL NOT NULL CHECK (x_position BETWEEN 0 AND 100),
            y_position REAL NOT NULL CHECK (y_position BETWEEN 0 AND 100),
            target_image_url TEXT NOT NULL,
            UNIQUE (look_id, product_id, target_image_url)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lookbook_filters (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL CHECK (type IN ('style', 'material', 'color')),
            value TEXT NOT NULL,
            UNIQUE (type, value)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_shop_looks_display_order ON shop_looks(display_order);
        CREATE INDEX IF NOT EXISTS idx_shop_looks_category ON shop_looks(category_id);
        CREATE INDEX IF NOT EXISTS idx_shop_look_items_look ON shop_look_items(look_id);
        CREATE INDEX IF NOT EXISTS idx_shop_look_items_product ON shop_look_items(product_id);
        CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
