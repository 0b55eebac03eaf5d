pub mod activations;
pub mod builder;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use builder::{build_app, AppConfig, MediaBackendConfig};
pub use errors::{ApiError, ApiResult};
pub use types::CatalogId;
