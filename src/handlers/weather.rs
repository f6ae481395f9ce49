use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::models::{Coordinate, RiskAssessment, WeatherReading};
use crate::utils::caching::CacheStats;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<CoordinateQuery> for Coordinate {
    fn from(query: CoordinateQuery) -> Self {
        Coordinate::new(query.latitude, query.longitude)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    pub caches: Vec<CacheStats>,
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheClearResponse {
    pub cleared: bool,
}

/// GET /api/weather/current
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(params): Query<CoordinateQuery>,
) -> Result<Json<WeatherReading>, AppError> {
    let reading = state.evaluator.get_weather(params.into()).await?;
    Ok(Json(reading))
}

/// GET /api/weather/flood-risk
pub async fn get_flood_risk(
    State(state): State<AppState>,
    Query(params): Query<CoordinateQuery>,
) -> Result<Json<RiskAssessment>, AppError> {
    let assessment = state.evaluator.assess_risk(params.into()).await?;
    Ok(Json(assessment))
}

/// GET /api/weather/cache/stats
pub async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        caches: state.evaluator.cache_stats().await,
        sweep_interval_seconds: state.settings.cache.sweep_interval_seconds,
    })
}

/// POST /api/weather/cache/clear
pub async fn clear_cache(State(state): State<AppState>) -> (StatusCode, Json<CacheClearResponse>) {
    info!("Manual cache clear requested");
    state.evaluator.sweep_stale_entries();
    (StatusCode::OK, Json(CacheClearResponse { cleared: true }))
}

pub fn create_weather_routes() -> Router<AppState> {
    Router::new()
        .route("/weather/current", get(get_current_weather))
        .route("/weather/flood-risk", get(get_flood_risk))
        .route("/weather/cache/stats", get(get_cache_stats))
        .route("/weather/cache/clear", post(clear_cache))
}
