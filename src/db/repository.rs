//! Database repository for CRUD operations.
//!
//! Every write runs in one transaction together with its revision bump. A
//! lookbook save also commits the lookbook row, the delete of its old
//! hotspots and the insert of the new set together.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateFilterTermRequest, CreateProductRequest, Facet, Hotspot, HotspotDraft, Lookbook,
    LookbookFilterTerm, Product, RevisionInfo, SaveLookbookRequest,
};

const LOOKBOOK_COLUMNS: &str = "id, title, slug, category_id, image_url, gallery_urls, style, material, color, is_active, display_order, updated_at, version";
const HOTSPOT_COLUMNS: &str =
    "id, look_id, product_id, x_position, y_position, target_image_url";
const PRODUCT_COLUMNS: &str = "id, name, price, original_price, image_url, slug, category_id";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    // ==================== PRODUCT OPERATIONS ====================

    /// List all products.
    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }

    /// Get a product by ID.
    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Resolve product ids to products. Ids that no longer exist are absent
    /// from the map.
    pub async fn products_by_ids(
        &self,
        ids: &[&str],
    ) -> Result<HashMap<String, Product>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(product_from_row)
            .map(|p| (p.id.clone(), p))
            .collect())
    }

    /// Create a new product.
    pub async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&id)
        .bind(&request.name)
        .bind(request.price)
        .bind(request.original_price)
        .bind(&request.image_url)
        .bind(&request.slug)
        .bind(&request.category_id)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(Product {
            id,
            name: request.name.clone(),
            price: request.price,
            original_price: request.original_price,
            image_url: request.image_url.clone(),
            slug: request.slug.clone(),
            category_id: request.category_id.clone(),
        })
    }

    /// Delete a product. Hotspots tagging it are kept and render without a product.
    pub async fn delete_product(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        let dangling: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shop_look_items WHERE product_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        if dangling > 0 {
            tracing::info!(product_id = %id, dangling, "Deleted product is still tagged in lookbooks");
        }
        Ok(())
    }

    // ==================== FILTER VOCABULARY OPERATIONS ====================

    /// List facet values in the order they were added.
    pub async fn list_filter_terms(&self) -> Result<Vec<LookbookFilterTerm>, AppError> {
        let rows = sqlx::query("SELECT id, type, value FROM lookbook_filters ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().filter_map(filter_term_from_row).collect())
    }

    /// Add a facet value.
    pub async fn create_filter_term(
        &self,
        request: &CreateFilterTermRequest,
    ) -> Result<LookbookFilterTerm, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let value = request.value.trim().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO lookbook_filters (id, type, value) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(request.facet.as_str())
            .bind(&value)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(LookbookFilterTerm {
            id,
            facet: request.facet,
            value,
        })
    }

    /// Delete a facet value. Lookbooks already carrying it keep their value.
    pub async fn delete_filter_term(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM lookbook_filters WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Filter value {} not found", id)));
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== LOOKBOOK OPERATIONS ====================

    /// List lookbooks in display order, with their hotspots.
    pub async fn list_lookbooks(&self, include_inactive: bool) -> Result<Vec<Lookbook>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {LOOKBOOK_COLUMNS} FROM shop_looks WHERE is_active = 1 OR ? ORDER BY display_order, title"
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        let mut lookbooks: Vec<Lookbook> = rows.iter().map(lookbook_from_row).collect();

        let item_rows = sqlx::query(&format!(
            "SELECT {HOTSPOT_COLUMNS} FROM shop_look_items ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut by_look: HashMap<String, Vec<Hotspot>> = HashMap::new();
        for hotspot in item_rows.iter().map(hotspot_from_row) {
            by_look
                .entry(hotspot.look_id.clone())
                .or_default()
                .push(hotspot);
        }
        for lookbook in &mut lookbooks {
            lookbook.hotspots = by_look.remove(&lookbook.id).unwrap_or_default();
        }

        Ok(lookbooks)
    }

    /// Get a lookbook by ID.
    pub async fn get_lookbook(&self, id: &str) -> Result<Option<Lookbook>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {LOOKBOOK_COLUMNS} FROM shop_looks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_hotspots(row.as_ref().map(lookbook_from_row)).await
    }

    /// Get a lookbook by slug, falling back to ID.
    pub async fn find_lookbook(&self, slug_or_id: &str) -> Result<Option<Lookbook>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {LOOKBOOK_COLUMNS} FROM shop_looks WHERE slug = ? OR id = ? ORDER BY slug = ? DESC LIMIT 1"
        ))
        .bind(slug_or_id)
        .bind(slug_or_id)
        .bind(slug_or_id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_hotspots(row.as_ref().map(lookbook_from_row)).await
    }

    /// Hotspots of a lookbook in placement order.
    pub async fn list_hotspots(&self, look_id: &str) -> Result<Vec<Hotspot>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {HOTSPOT_COLUMNS} FROM shop_look_items WHERE look_id = ? ORDER BY rowid"
        ))
        .bind(look_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(hotspot_from_row).collect())
    }

    async fn with_hotspots(&self, lookbook: Option<Lookbook>) -> Result<Option<Lookbook>, AppError> {
        match lookbook {
            Some(mut lookbook) => {
                lookbook.hotspots = self.list_hotspots(&lookbook.id).await?;
                Ok(Some(lookbook))
            }
            None => Ok(None),
        }
    }

    /// Create a lookbook together with its hotspots.
    pub async fn create_lookbook(
        &self,
        request: &SaveLookbookRequest,
        hotspots: &[HotspotDraft],
    ) -> Result<Lookbook, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let gallery_json = serde_json::to_string(&request.gallery_urls)?;

        let mut tx = self.pool.begin().await?;

        let display_order = match request.display_order {
            Some(order) => order,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(display_order), -1) + 1 FROM shop_looks",
                )
                .fetch_one(&mut *tx)
                .await?
            }
        };

        sqlx::query(&format!(
            "INSERT INTO shop_looks ({LOOKBOOK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"
        ))
        .bind(&id)
        .bind(request.title.trim())
        .bind(blank_to_none(&request.slug))
        .bind(request.category_id.trim())
        .bind(request.image_url.trim())
        .bind(&gallery_json)
        .bind(blank_to_none(&request.style))
        .bind(blank_to_none(&request.material))
        .bind(blank_to_none(&request.color))
        .bind(request.is_active)
        .bind(display_order)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        insert_hotspots(&mut tx, &id, hotspots).await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(look_id = %id, hotspots = hotspots.len(), "Created lookbook");

        self.get_lookbook(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lookbook {} not found", id)))
    }

    /// Save a lookbook: replace every field and the full hotspot set.
    ///
    /// Without `expected_version` the last save wins.
    pub async fn save_lookbook(
        &self,
        id: &str,
        request: &SaveLookbookRequest,
        hotspots: &[HotspotDraft],
    ) -> Result<Lookbook, AppError> {
        let now = Utc::now().to_rfc3339();
        let gallery_json = serde_json::to_string(&request.gallery_urls)?;

        let mut tx = self.pool.begin().await?;

        let (current_version, current_order) =
            check_version(&mut tx, id, request.expected_version).await?;
        let display_order = request.display_order.unwrap_or(current_order);

        let result = sqlx::query(
            r#"UPDATE shop_looks SET
                title = ?, slug = ?, category_id = ?, image_url = ?, gallery_urls = ?,
                style = ?, material = ?, color = ?, is_active = ?, display_order = ?,
                updated_at = ?, version = ?
            WHERE id = ? AND version = ?"#,
        )
        .bind(request.title.trim())
        .bind(blank_to_none(&request.slug))
        .bind(request.category_id.trim())
        .bind(request.image_url.trim())
        .bind(&gallery_json)
        .bind(blank_to_none(&request.style))
        .bind(blank_to_none(&request.material))
        .bind(blank_to_none(&request.color))
        .bind(request.is_active)
        .bind(display_order)
        .bind(&now)
        .bind(current_version + 1)
        .bind(id)
        .bind(current_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::VersionMismatch {
                message: "Concurrent modification detected".to_string(),
                current_version,
            });
        }

        let removed = delete_hotspots(&mut tx, id).await?;
        insert_hotspots(&mut tx, id, hotspots).await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(
            look_id = %id,
            removed,
            inserted = hotspots.len(),
            "Saved lookbook"
        );

        self.get_lookbook(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lookbook {} not found", id)))
    }

    /// Replace only the hotspot set of a lookbook, bumping its version.
    pub async fn replace_hotspots(
        &self,
        id: &str,
        expected_version: Option<i64>,
        hotspots: &[HotspotDraft],
    ) -> Result<Lookbook, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let (current_version, _) = check_version(&mut tx, id, expected_version).await?;

        let result = sqlx::query(
            "UPDATE shop_looks SET updated_at = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(&now)
        .bind(current_version + 1)
        .bind(id)
        .bind(current_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::VersionMismatch {
                message: "Concurrent modification detected".to_string(),
                current_version,
            });
        }

        delete_hotspots(&mut tx, id).await?;
        insert_hotspots(&mut tx, id, hotspots).await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        self.get_lookbook(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lookbook {} not found", id)))
    }

    /// Delete a lookbook and its hotspots.
    pub async fn delete_lookbook(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        delete_hotspots(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM shop_looks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lookbook {} not found", id)));
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Set `display_order` of each listed lookbook to its index.
    pub async fn reorder_lookbooks(&self, ids: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for (index, id) in ids.iter().enumerate() {
            let result = sqlx::query("UPDATE shop_looks SET display_order = ? WHERE id = ?")
                .bind(index as i64)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("Lookbook {} not found", id)));
            }
        }

        // Increment revision once for the entire reorder
        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

// Helpers shared by the transactional writes

async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Read the lookbook's version and display order, enforcing `expected`.
async fn check_version(
    conn: &mut SqliteConnection,
    id: &str,
    expected: Option<i64>,
) -> Result<(i64, i64), AppError> {
    let row = sqlx::query("SELECT version, display_order FROM shop_looks WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lookbook {} not found", id)))?;

    let version: i64 = row.get("version");
    if let Some(expected) = expected {
        if version != expected {
            return Err(AppError::VersionMismatch {
                message: format!(
                    "Version mismatch: expected {}, current {}",
                    expected, version
                ),
                current_version: version,
            });
        }
    }
    Ok((version, row.get("display_order")))
}

async fn delete_hotspots(conn: &mut SqliteConnection, look_id: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM shop_look_items WHERE look_id = ?")
        .bind(look_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

async fn insert_hotspots(
    conn: &mut SqliteConnection,
    look_id: &str,
    hotspots: &[HotspotDraft],
) -> Result<(), AppError> {
    let insert = format!("INSERT INTO shop_look_items ({HOTSPOT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)");
    for hotspot in hotspots {
        sqlx::query(&insert)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(look_id)
            .bind(&hotspot.product_id)
            .bind(hotspot.x_position)
            .bind(hotspot.y_position)
            .bind(&hotspot.target_image_url)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// Helper functions for row conversion

fn lookbook_from_row(row: &sqlx::sqlite::SqliteRow) -> Lookbook {
    let gallery_str: String = row.get("gallery_urls");
    Lookbook {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        category_id: row.get("category_id"),
        image_url: row.get("image_url"),
        gallery_urls: parse_json_array(&gallery_str),
        style: row.get("style"),
        material: row.get("material"),
        color: row.get("color"),
        is_active: row.get("is_active"),
        display_order: row.get("display_order"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
        hotspots: Vec::new(),
    }
}

fn hotspot_from_row(row: &sqlx::sqlite::SqliteRow) -> Hotspot {
    Hotspot {
        id: row.get("id"),
        look_id: row.get("look_id"),
        product_id: row.get("product_id"),
        x_position: row.get("x_position"),
        y_position: row.get("y_position"),
        target_image_url: row.get("target_image_url"),
    }
}

fn product_from_row(row: &sqlx::sqlite::SqliteRow) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        original_price: row.get("original_price"),
        image_url: row.get("image_url"),
        slug: row.get("slug"),
        category_id: row.get("category_id"),
    }
}

fn filter_term_from_row(row: &sqlx::sqlite::SqliteRow) -> Option<LookbookFilterTerm> {
    let facet: String = row.get("type");
    Some(LookbookFilterTerm {
        id: row.get("id"),
        facet: Facet::parse(&facet)?,
        value: row.get("value"),
    })
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
