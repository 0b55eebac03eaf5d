use super::types::HealthStatus;
use axum::{extract::State, routing::get, Json, Router};
use std::time::Instant;

/// Health activation - liveness and uptime
#[derive(Clone)]
pub struct Health {
    start_time: Instant,
}

impl Health {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn check(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new()
    }
}

pub fn health_router(health: Health) -> Router {
    Router::new()
        .route("/api/health", get(check))
        .with_state(health)
}

async fn check(State(health): State<Health>) -> Json<HealthStatus> {
    Json(health.check())
}
