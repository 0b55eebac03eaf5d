//! Category documents and items on SQLite
//!
//! A root category is stored as one row whose `subcategories` column holds
//! the whole nested tree as JSON. Saves replace that row wholesale, so a
//! reader sees either the old tree or the new one and concurrent writers to
//! the same root resolve last-writer-wins.

use super::types::{CatalogError, Category, Item, Node};
use crate::types::CatalogId;
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow},
    ConnectOptions, QueryBuilder, Row, Sqlite,
};
use std::path::PathBuf;

/// Configuration for catalog storage
#[derive(Debug, Clone)]
pub struct CatalogStorageConfig {
    /// Path to SQLite database
    pub db_path: PathBuf,
}

impl Default for CatalogStorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("catalog.db"),
        }
    }
}

/// Which items a query returns
#[derive(Debug, Clone)]
pub enum ItemFilter {
    All,
    /// `category_id` or `subcategory_id` is one of the ids
    InScope(Vec<CatalogId>),
    CategoryIdIn(Vec<CatalogId>),
    SubcategoryIdIn(Vec<CatalogId>),
}

const ITEM_COLUMNS: &str = "id, barcode, name, description, category, category_id, subcategory, \
     subcategory_id, price, specs, images, created_at, updated_at";

/// SQLite-backed store for category documents and items.
///
/// Injected directly into the catalog service; nothing here knows about the
/// tree structure beyond (de)serializing it.
#[derive(Clone)]
pub struct CatalogStorage {
    pool: SqlitePool,
}

impl CatalogStorage {
    /// Open (creating if missing) the database and run migrations
    pub async fn new(config: CatalogStorageConfig) -> Result<Self, CatalogError> {
        let db_url = format!("sqlite:{}?mode=rwc", config.db_path.display());
        let mut connect_options: SqliteConnectOptions = db_url
            .parse()
            .map_err(|e| CatalogError::Storage(format!("Failed to parse database URL: {}", e)))?;
        connect_options.disable_statement_logging();
        let pool = SqlitePool::connect_with(connect_options)
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to connect to catalog database: {}", e)))?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    async fn run_migrations(&self) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                image_url TEXT,
                subcategories TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                barcode TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                category_id TEXT NOT NULL,
                subcategory TEXT NOT NULL DEFAULT '',
                subcategory_id TEXT,
                price TEXT NOT NULL,
                specs TEXT NOT NULL DEFAULT '[]',
                images TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_category ON items(category_id);
            CREATE INDEX IF NOT EXISTS idx_items_subcategory ON items(subcategory_id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CatalogError::Storage(format!("Failed to run catalog migrations: {}", e)))?;

        Ok(())
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Every root, in the order they were first saved
    pub async fn find_all_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let rows = sqlx::query(
            "SELECT id, name, image_url, subcategories, created_at, updated_at
             FROM categories ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_category).collect()
    }

    pub async fn find_category_by_id(&self, id: &CatalogId) -> Result<Option<Category>, CatalogError> {
        let row = sqlx::query(
            "SELECT id, name, image_url, subcategories, created_at, updated_at
             FROM categories WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_category).transpose()
    }

    /// Insert, or replace the whole document of, a root category.
    ///
    /// A replace keeps the stored `created_at` and the root's list position.
    pub async fn save_category(&self, category: &Category) -> Result<Category, CatalogError> {
        let subcategories = serde_json::to_string(&category.subcategories)?;

        sqlx::query(
            "INSERT INTO categories (id, name, image_url, subcategories, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                image_url = excluded.image_url,
                subcategories = excluded.subcategories,
                updated_at = excluded.updated_at",
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.image_url)
        .bind(subcategories)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        self.find_category_by_id(&category.id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(category.id))
    }

    /// Returns whether a row was deleted
    pub async fn delete_category_by_id(&self, id: &CatalogId) -> Result<bool, CatalogError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Items matching `filter`, ordered by name then id
    pub async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM items", ITEM_COLUMNS));

        match filter {
            ItemFilter::All => {}
            ItemFilter::InScope(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                query.push(" WHERE category_id IN ");
                push_id_list(&mut query, ids);
                query.push(" OR subcategory_id IN ");
                push_id_list(&mut query, ids);
            }
            ItemFilter::CategoryIdIn(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                query.push(" WHERE category_id IN ");
                push_id_list(&mut query, ids);
            }
            ItemFilter::SubcategoryIdIn(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                query.push(" WHERE subcategory_id IN ");
                push_id_list(&mut query, ids);
            }
        }
        query.push(" ORDER BY name, id");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_item).collect()
    }

    pub async fn find_all_items(&self) -> Result<Vec<Item>, CatalogError> {
        self.find_items(&ItemFilter::All).await
    }

    pub async fn find_item_by_id(&self, id: &CatalogId) -> Result<Option<Item>, CatalogError> {
        let row = sqlx::query(&format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_item).transpose()
    }

    /// Insert or fully replace an item
    pub async fn save_item(&self, item: &Item) -> Result<Item, CatalogError> {
        sqlx::query(
            "INSERT INTO items (id, barcode, name, description, category, category_id, subcategory,
                                subcategory_id, price, specs, images, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                barcode = excluded.barcode,
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                category_id = excluded.category_id,
                subcategory = excluded.subcategory,
                subcategory_id = excluded.subcategory_id,
                price = excluded.price,
                specs = excluded.specs,
                images = excluded.images,
                updated_at = excluded.updated_at",
        )
        .bind(item.id.to_string())
        .bind(&item.barcode)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category)
        .bind(item.category_id.to_string())
        .bind(&item.subcategory)
        .bind(item.subcategory_id.map(|id| id.to_string()))
        .bind(serde_json::to_string(&item.price)?)
        .bind(serde_json::to_string(&item.specs)?)
        .bind(serde_json::to_string(&item.images)?)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        self.find_item_by_id(&item.id)
            .await?
            .ok_or(CatalogError::ItemNotFound(item.id))
    }

    /// Returns whether a row was deleted
    pub async fn delete_item_by_id(&self, id: &CatalogId) -> Result<bool, CatalogError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Append `(?, ?, ...)` with one bound parameter per id
fn push_id_list(query: &mut QueryBuilder<'_, Sqlite>, ids: &[CatalogId]) {
    query.push("(");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(")");
}

fn parse_id(raw: &str, column: &str) -> Result<CatalogId, CatalogError> {
    CatalogId::parse_str(raw)
        .map_err(|e| CatalogError::Storage(format!("Invalid {} in storage: {}", column, e)))
}

fn row_to_category(row: SqliteRow) -> Result<Category, CatalogError> {
    let id: String = row.try_get("id")?;
    let subcategories: String = row.try_get("subcategories")?;
    let subcategories: Vec<Node> = serde_json::from_str(&subcategories)?;

    Ok(Category {
        id: parse_id(&id, "category id")?,
        name: row.try_get("name")?,
        image_url: row.try_get("image_url")?,
        subcategories,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_item(row: SqliteRow) -> Result<Item, CatalogError> {
    let id: String = row.try_get("id")?;
    let category_id: String = row.try_get("category_id")?;
    let subcategory_id: Option<String> = row.try_get("subcategory_id")?;
    let price: String = row.try_get("price")?;
    let specs: String = row.try_get("specs")?;
    let images: String = row.try_get("images")?;

    Ok(Item {
        id: parse_id(&id, "item id")?,
        barcode: row.try_get("barcode")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        category_id: parse_id(&category_id, "item category id")?,
        subcategory: row.try_get("subcategory")?,
        subcategory_id: subcategory_id
            .as_deref()
            .map(|raw| parse_id(raw, "item subcategory id"))
            .transpose()?,
        price: serde_json::from_str::<Value>(&price)?,
        specs: serde_json::from_str(&specs)?,
        images: serde_json::from_str(&images)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
