use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    /// Whether the ML service answered its probe. Assessments still work
    /// without it, through fallback scoring.
    pub ml_service_available: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ml_service_available = state.evaluator.predictor_available().await;

    Json(HealthResponse {
        status: if ml_service_available { "healthy" } else { "degraded" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ml_service_available,
    })
}
