use std::fmt;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

#[derive(Debug, Clone)]
pub enum AppError {
    ConfigError(String),
    ValidationError(String),
    NotFound(String),
    ExternalServiceError(String),
    ExternalApiError(String),
    TimeoutError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ExternalServiceError(msg) => write!(f, "External service error: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::TimeoutError(msg) => write!(f, "Timeout: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalServiceError(_) | AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::TimeoutError(format!("HTTP request timed out: {}", err))
        } else {
            AppError::ExternalApiError(format!("HTTP request error: {}", err))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::InternalError(format!("Prometheus metrics error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_failures_map_to_gateway_statuses() {
        let response = AppError::ExternalApiError("weather down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = AppError::TimeoutError("weather fetch".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let response = AppError::ConfigError("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display_includes_category() {
        let err = AppError::ExternalApiError("status 503".to_string());
        assert_eq!(err.to_string(), "External API error: status 503");
    }
}
