pub mod health;
pub mod metrics;
pub mod weather;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use weather::{
    clear_cache,
    create_weather_routes,
    get_cache_stats,
    get_current_weather,
    get_flood_risk,
    CacheClearResponse,
    CacheStatsResponse,
    CoordinateQuery,
};

/// Full HTTP surface of the service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api", create_weather_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
