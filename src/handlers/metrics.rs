use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::error::AppError;
use crate::AppState;

/// Handler for Prometheus metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.metrics.export_metrics() {
        Ok(metrics_text) => Ok((
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            metrics_text,
        )
            .into_response()),
        Err(e) => {
            error!("Failed to export metrics: {}", e);
            Err(e)
        }
    }
}
