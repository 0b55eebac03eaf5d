use serde::{Deserialize, Serialize};

/// Current health status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub uptime_seconds: u64,
    pub timestamp: i64,
}
