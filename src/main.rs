use flood_risk_monitor::{
    config::Settings,
    handlers::create_router,
    services::{CacheSweeper, EvaluatorTimeouts, MlServiceClient, OpenWeatherClient, RiskEvaluator},
    utils::{caching::CacheManager, monitoring::ServiceMetrics},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    info!("Starting Flood Risk Monitor");
    if settings.weather.api_key.is_empty() {
        warn!("WEATHER_API_KEY is not set; weather requests will likely be rejected");
    }

    let metrics = Arc::new(ServiceMetrics::new()?);
    let cache = Arc::new(CacheManager::from_settings(&settings.cache)?);
    let weather_source = Arc::new(OpenWeatherClient::from_settings(&settings.weather)?);
    let predictor = Arc::new(MlServiceClient::from_settings(&settings.ml_service)?);

    let evaluator = Arc::new(
        RiskEvaluator::new(cache, weather_source, predictor, metrics.clone()).with_timeouts(EvaluatorTimeouts {
            weather: settings.weather.timeout(),
            predictor: settings.ml_service.timeout(),
        }),
    );

    // Periodic cache sweep
    let sweeper = CacheSweeper::start(evaluator.clone(), settings.cache.sweep_interval());

    let app_state = AppState {
        settings: settings.clone(),
        evaluator,
        metrics,
    };
    let app = create_router(app_state);

    let host: std::net::IpAddr = settings
        .api
        .host
        .parse()
        .map_err(|e| format!("API_HOST {:?} is not an IP address: {}", settings.api.host, e))?;
    let addr = SocketAddr::new(host, settings.api.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server running on {}", addr);
    info!("  GET    /api/weather/current?latitude=..&longitude=..");
    info!("  GET    /api/weather/flood-risk?latitude=..&longitude=..");
    info!("  GET    /api/weather/cache/stats");
    info!("  POST   /api/weather/cache/clear");
    info!("  GET    /health");
    info!("  GET    /metrics");

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Received shutdown signal");
    });

    if let Err(e) = server.await {
        error!("Web server error: {}", e);
    }

    sweeper.shutdown().await;
    info!("Shutting down Flood Risk Monitor");
    Ok(())
}
