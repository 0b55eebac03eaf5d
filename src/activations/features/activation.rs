//! Features activation - usage areas, measurements and properties that
//! products can be tagged with

use super::storage::{FeatureStorage, FeatureStorageConfig};
use super::types::{
    BulkCreateResult, BulkFeatureInput, Feature, FeatureError, FeatureInput, FeatureKind,
};
use crate::errors::{ApiJson, ApiResult};
use crate::types::{current_timestamp, CatalogId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

pub struct Features {
    storage: Arc<FeatureStorage>,
}

impl Features {
    pub async fn new(config: FeatureStorageConfig) -> Result<Self, FeatureError> {
        let storage = FeatureStorage::new(config).await?;
        Ok(Self {
            storage: Arc::new(storage),
        })
    }

    pub async fn list(&self) -> Result<Vec<Feature>, FeatureError> {
        self.storage.list().await
    }

    pub async fn create(&self, input: FeatureInput) -> Result<Feature, FeatureError> {
        let feature = self.storage.create(input.into_new()?).await?;
        tracing::info!(feature_id = %feature.id, name = %feature.name, kind = %feature.kind, "Feature created");
        Ok(feature)
    }

    /// Create each entry independently, collecting a message per failure
    pub async fn create_bulk(&self, inputs: Vec<FeatureInput>) -> BulkCreateResult {
        let mut features = Vec::new();
        let mut errors = Vec::new();

        for input in inputs {
            let label = input.name.clone().unwrap_or_default();
            match self.create(input).await {
                Ok(feature) => features.push(feature),
                Err(FeatureError::AlreadyExists { name, .. }) => {
                    errors.push(format!("\"{}\" already exists", name))
                }
                Err(e) => errors.push(format!("\"{}\": {}", label, e)),
            }
        }

        tracing::info!(added = features.len(), errors = errors.len(), "Bulk feature create finished");
        BulkCreateResult {
            message: format!("{} features added, {} errors", features.len(), errors.len()),
            features,
            errors,
        }
    }

    /// Overwrite the supplied fields; omitted ones keep their stored values
    pub async fn update(&self, id: CatalogId, input: FeatureInput) -> Result<Feature, FeatureError> {
        let mut feature = self.storage.get(&id).await?.ok_or(FeatureError::NotFound(id))?;

        if let Some(name) = input.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(FeatureError::Validation("name must not be empty".into()));
            }
            feature.name = name.to_string();
        }
        if let Some(description) = input.description {
            feature.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(kind) = input.kind.as_deref() {
            feature.kind = kind.parse()?;
        }
        if let Some(has_value) = input.has_value {
            feature.has_value = has_value;
        }
        feature.updated_at = current_timestamp();

        self.storage.update(&feature).await?;
        tracing::info!(feature_id = %id, "Feature updated");
        Ok(feature)
    }

    pub async fn delete(&self, id: CatalogId) -> Result<(), FeatureError> {
        if !self.storage.delete(&id).await? {
            return Err(FeatureError::NotFound(id));
        }
        tracing::info!(feature_id = %id, "Feature deleted");
        Ok(())
    }

    pub async fn delete_by_kind(&self, kind: FeatureKind) -> Result<u64, FeatureError> {
        let deleted = self.storage.delete_by_kind(kind).await?;
        tracing::info!(kind = %kind, deleted, "Features deleted by type");
        Ok(deleted)
    }
}

impl Clone for Features {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn features_router(features: Features) -> Router {
    Router::new()
        .route("/api/features", get(list_features).post(create_feature))
        .route("/api/features/bulk", post(create_features_bulk))
        .route("/api/features/type/:kind", delete(delete_features_by_kind))
        .route(
            "/api/features/:id",
            put(update_feature).delete(delete_feature),
        )
        .with_state(features)
}

async fn list_features(State(features): State<Features>) -> ApiResult<impl IntoResponse> {
    Ok(Json(features.list().await?))
}

async fn create_feature(
    State(features): State<Features>,
    ApiJson(input): ApiJson<FeatureInput>,
) -> ApiResult<impl IntoResponse> {
    let feature = features.create(input).await?;
    Ok((StatusCode::CREATED, Json(feature)))
}

async fn create_features_bulk(
    State(features): State<Features>,
    ApiJson(input): ApiJson<BulkFeatureInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(features.create_bulk(input.features).await))
}

async fn update_feature(
    State(features): State<Features>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<FeatureInput>,
) -> ApiResult<impl IntoResponse> {
    let id = CatalogId::parse_str(&id)?;
    Ok(Json(features.update(id, input).await?))
}

async fn delete_feature(
    State(features): State<Features>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = CatalogId::parse_str(&id)?;
    features.delete(id).await?;
    Ok(Json(json!({ "message": "Feature deleted" })))
}

async fn delete_features_by_kind(
    State(features): State<Features>,
    Path(kind): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let kind: FeatureKind = kind.parse()?;
    let deleted = features.delete_by_kind(kind).await?;
    Ok(Json(json!({
        "message": format!("{} features deleted", deleted),
        "deletedCount": deleted,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    async fn create_test_features() -> (Features, TempDir) {
        let dir = tempdir().unwrap();
        let config = FeatureStorageConfig {
            db_path: dir.path().join("test_features.db"),
        };
        (Features::new(config).await.unwrap(), dir)
    }

    fn input(name: &str, kind: &str) -> FeatureInput {
        FeatureInput {
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_ordered_by_type_then_name() {
        let (features, _dir) = create_test_features().await;
        features.create(input("Width", "product_measurements")).await.unwrap();
        features.create(input("Office", "usage_area")).await.unwrap();
        features.create(input("Height", "product_measurements")).await.unwrap();

        let names: Vec<_> = features.list().await.unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Height", "Width", "Office"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_and_type_rejected() {
        let (features, _dir) = create_test_features().await;
        features.create(input("Office", "usage_area")).await.unwrap();

        let err = features.create(input("Office", "usage_area")).await.unwrap_err();
        assert!(matches!(err, FeatureError::AlreadyExists { .. }));

        // Same name under another type is fine
        features.create(input("Office", "product_properties")).await.unwrap();
    }

    #[tokio::test]
    async fn test_bulk_create_reports_per_entry_errors() {
        let (features, _dir) = create_test_features().await;
        features.create(input("Garden", "usage_area")).await.unwrap();

        let result = features
            .create_bulk(vec![
                input("Garden", "usage_area"),
                input("Kitchen", "usage_area"),
                input("Shiny", "finish"),
            ])
            .await;

        assert_eq!(result.features.len(), 1);
        assert_eq!(result.features[0].name, "Kitchen");
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("Garden"));
        assert!(result.errors[1].contains("Shiny"));
        assert_eq!(features.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_partial_and_missing() {
        let (features, _dir) = create_test_features().await;
        let created = features.create(input("Depth", "product_measurements")).await.unwrap();

        let updated = features
            .update(
                created.id,
                FeatureInput {
                    has_value: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.has_value);
        assert_eq!(updated.name, "Depth");
        assert_eq!(updated.kind, FeatureKind::ProductMeasurements);

        assert!(matches!(
            features.update(CatalogId::new(), FeatureInput::default()).await,
            Err(FeatureError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_kind_returns_count() {
        let (features, _dir) = create_test_features().await;
        features.create(input("A", "usage_area")).await.unwrap();
        features.create(input("B", "usage_area")).await.unwrap();
        let keep = features.create(input("C", "product_properties")).await.unwrap();

        assert_eq!(features.delete_by_kind(FeatureKind::UsageArea).await.unwrap(), 2);
        assert_eq!(features.list().await.unwrap(), vec![keep.clone()]);

        features.delete(keep.id).await.unwrap();
        assert!(matches!(
            features.delete(keep.id).await,
            Err(FeatureError::NotFound(_))
        ));
    }
}
