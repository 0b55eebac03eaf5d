use catalog::{
    activations::{
        catalog::CatalogStorageConfig,
        features::FeatureStorageConfig,
        media::{ImageKitConfig, LocalMediaConfig},
    },
    build_app, AppConfig, MediaBackendConfig,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Product catalog backend
#[derive(Debug, Parser)]
#[command(name = "catalog", version, about)]
struct Args {
    /// Address to bind
    #[arg(long, env = "CATALOG_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "CATALOG_PORT", default_value_t = 5002)]
    port: u16,

    /// Directory holding the SQLite databases
    #[arg(long, env = "CATALOG_DATA_DIR", default_value = ".catalog")]
    data_dir: PathBuf,

    /// Directory for uploaded images when ImageKit is not configured
    /// (defaults to `<data-dir>/media`)
    #[arg(long, env = "CATALOG_MEDIA_DIR")]
    media_dir: Option<PathBuf>,

    /// Public URL prefix for locally stored images
    #[arg(long, env = "CATALOG_MEDIA_BASE_URL", default_value = "/media")]
    media_base_url: String,

    /// ImageKit private API key; enables ImageKit uploads
    #[arg(long, env = "IMAGEKIT_PRIVATE_KEY", hide_env_values = true)]
    imagekit_private_key: Option<String>,

    /// ImageKit URL endpoint, e.g. https://ik.imagekit.io/<id>/
    #[arg(long, env = "IMAGEKIT_URL_ENDPOINT")]
    imagekit_url_endpoint: Option<String>,
}

impl Args {
    /// Ensure the data directory exists and derive storage configs from it
    fn app_config(&self) -> std::io::Result<AppConfig> {
        std::fs::create_dir_all(&self.data_dir)?;

        let media = match &self.imagekit_private_key {
            Some(key) if !key.is_empty() => MediaBackendConfig::ImageKit(ImageKitConfig {
                private_key: key.clone(),
                url_endpoint: self.imagekit_url_endpoint.clone(),
            }),
            _ => MediaBackendConfig::Local(LocalMediaConfig {
                root: self
                    .media_dir
                    .clone()
                    .unwrap_or_else(|| self.data_dir.join("media")),
                base_url: self.media_base_url.clone(),
            }),
        };

        Ok(AppConfig {
            catalog: CatalogStorageConfig {
                db_path: self.data_dir.join("catalog.db"),
            },
            features: FeatureStorageConfig {
                db_path: self.data_dir.join("features.db"),
            },
            media,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (silently ignore if not found)
    dotenvy::dotenv().ok();

    // Show catalog and request traces, hide noisy lower-level crates
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("catalog=info,tower_http=info,sqlx=warn,hyper=off")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = args.app_config()?;
    let app = build_app(config).await?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Catalog server started at http://{}", addr);
    tracing::info!("Data directory: {}", args.data_dir.display());
    tracing::info!("Health check: http://{}/api/health", addr);
    tracing::info!("Scoped products: http://{}/api/products/by-category/:id", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
