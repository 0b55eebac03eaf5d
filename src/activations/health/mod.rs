mod activation;
mod types;

pub use activation::{health_router, Health};
pub use types::HealthStatus;
