//! App builder - constructs the fully configured HTTP application
//!
//! Used by the main binary and by the HTTP tests.

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::activations::catalog::{catalog_router, CatalogService, CatalogStorage, CatalogStorageConfig};
use crate::activations::features::{features_router, FeatureStorageConfig, Features};
use crate::activations::health::{health_router, Health};
use crate::activations::media::{
    media_router, ImageKitConfig, ImageKitStore, LocalMediaConfig, LocalMediaStore, Media,
    MediaStore,
};

/// Path local uploads are served under
pub const LOCAL_MEDIA_ROUTE: &str = "/media";

/// Which object store receives uploaded images
#[derive(Debug, Clone)]
pub enum MediaBackendConfig {
    ImageKit(ImageKitConfig),
    Local(LocalMediaConfig),
}

impl Default for MediaBackendConfig {
    fn default() -> Self {
        MediaBackendConfig::Local(LocalMediaConfig::default())
    }
}

/// Everything needed to build the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub catalog: CatalogStorageConfig,
    pub features: FeatureStorageConfig,
    pub media: MediaBackendConfig,
}

/// Open storages and compose every activation's routes into one router
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let catalog = CatalogService::new(CatalogStorage::new(config.catalog).await?);
    let features = Features::new(config.features).await?;

    let (store, served_dir) = match config.media {
        MediaBackendConfig::ImageKit(imagekit) => {
            let store: Arc<dyn MediaStore> = Arc::new(ImageKitStore::new(imagekit));
            (store, None)
        }
        MediaBackendConfig::Local(local) => {
            let root = local.root.clone();
            let store: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(local));
            (store, Some(root))
        }
    };
    let media = Media::new(store);
    tracing::info!(backend = media.backend(), "Media store ready");

    let mut app = Router::new()
        .merge(health_router(Health::new()))
        .merge(catalog_router(catalog))
        .merge(features_router(features))
        .merge(media_router(media));

    if let Some(dir) = served_dir {
        app = app.nest_service(LOCAL_MEDIA_ROUTE, ServeDir::new(dir));
    }

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    ))
}
