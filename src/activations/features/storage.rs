//! Feature storage using SQLite

use super::types::{Feature, FeatureError, FeatureKind, NewFeature};
use crate::types::{current_timestamp, CatalogId};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow},
    ConnectOptions, Row,
};
use std::path::PathBuf;

/// Configuration for feature storage
#[derive(Debug, Clone)]
pub struct FeatureStorageConfig {
    /// Path to SQLite database
    pub db_path: PathBuf,
}

impl Default for FeatureStorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("features.db"),
        }
    }
}

/// Storage layer for product features
pub struct FeatureStorage {
    pool: SqlitePool,
}

impl FeatureStorage {
    pub async fn new(config: FeatureStorageConfig) -> Result<Self, FeatureError> {
        let db_url = format!("sqlite:{}?mode=rwc", config.db_path.display());
        let mut connect_options: SqliteConnectOptions = db_url
            .parse()
            .map_err(|e| FeatureError::Storage(format!("Failed to parse database URL: {}", e)))?;
        connect_options.disable_statement_logging();
        let pool = SqlitePool::connect_with(connect_options)
            .await
            .map_err(|e| FeatureError::Storage(format!("Failed to connect to features database: {}", e)))?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    async fn run_migrations(&self) -> Result<(), FeatureError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS features (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                type TEXT NOT NULL,
                has_value INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(name, type)
            );

            CREATE INDEX IF NOT EXISTS idx_features_type ON features(type);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| FeatureError::Storage(format!("Failed to run feature migrations: {}", e)))?;

        Ok(())
    }

    /// All features, grouped by type then name
    pub async fn list(&self) -> Result<Vec<Feature>, FeatureError> {
        let rows = sqlx::query(
            "SELECT id, name, description, type, has_value, created_at, updated_at
             FROM features ORDER BY type, name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_feature).collect()
    }

    pub async fn get(&self, id: &CatalogId) -> Result<Option<Feature>, FeatureError> {
        let row = sqlx::query(
            "SELECT id, name, description, type, has_value, created_at, updated_at
             FROM features WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_feature).transpose()
    }

    /// Insert a feature; a clash on (name, type) is `AlreadyExists`
    pub async fn create(&self, new: NewFeature) -> Result<Feature, FeatureError> {
        let now = current_timestamp();
        let feature = Feature {
            id: CatalogId::new(),
            name: new.name,
            description: new.description,
            kind: new.kind,
            has_value: new.has_value,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO features (id, name, description, type, has_value, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(feature.id.to_string())
        .bind(&feature.name)
        .bind(&feature.description)
        .bind(feature.kind.as_str())
        .bind(feature.has_value)
        .bind(feature.created_at)
        .bind(feature.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &feature.name, feature.kind))?;

        Ok(feature)
    }

    /// Overwrite every field except identity and creation time
    pub async fn update(&self, feature: &Feature) -> Result<(), FeatureError> {
        let result = sqlx::query(
            "UPDATE features SET name = ?, description = ?, type = ?, has_value = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&feature.name)
        .bind(&feature.description)
        .bind(feature.kind.as_str())
        .bind(feature.has_value)
        .bind(feature.updated_at)
        .bind(feature.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &feature.name, feature.kind))?;

        if result.rows_affected() == 0 {
            return Err(FeatureError::NotFound(feature.id));
        }
        Ok(())
    }

    /// Returns whether a row was deleted
    pub async fn delete(&self, id: &CatalogId) -> Result<bool, FeatureError> {
        let result = sqlx::query("DELETE FROM features WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the number of deleted rows
    pub async fn delete_by_kind(&self, kind: FeatureKind) -> Result<u64, FeatureError> {
        let result = sqlx::query("DELETE FROM features WHERE type = ?")
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn unique_violation(err: sqlx::Error, name: &str, kind: FeatureKind) -> FeatureError {
    if let sqlx::Error::Database(db) = &err {
        if db.message().contains("UNIQUE constraint failed") {
            return FeatureError::AlreadyExists {
                name: name.to_string(),
                kind,
            };
        }
    }
    FeatureError::from(err)
}

fn row_to_feature(row: SqliteRow) -> Result<Feature, FeatureError> {
    let id: String = row.try_get("id")?;
    let kind: String = row.try_get("type")?;

    Ok(Feature {
        id: CatalogId::parse_str(&id)
            .map_err(|e| FeatureError::Storage(format!("Invalid feature id in storage: {}", e)))?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        kind: kind.parse()?,
        has_value: row.try_get("has_value")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
