//! Features activation module
//!
//! Product features (usage areas, measurements, properties) kept as a flat
//! list, unique per name and type.

mod activation;
mod storage;
mod types;

pub use activation::{features_router, Features};
pub use storage::{FeatureStorage, FeatureStorageConfig};
pub use types::{
    BulkCreateResult, BulkFeatureInput, Feature, FeatureError, FeatureInput, FeatureKind,
    NewFeature,
};
