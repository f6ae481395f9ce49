use std::fmt::Display;
use std::time::Duration;
use tokio_retry::{strategy::{jitter, ExponentialBackoff}, Retry};
use tracing::{warn, error, debug};

use crate::error::AppError;

/// Backoff settings for retried external calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first one; 0 disables retrying
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Configuration for ML service calls; a slow predictor only delays the fallback
    pub fn ml_service(max_retries: usize) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Execute an operation with exponential backoff retry
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation: F,
    config: RetryConfig,
    operation_name: &str,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let retry_strategy = ExponentialBackoff::from_millis(config.initial_delay.as_millis().max(1) as u64)
        .max_delay(config.max_delay)
        .map(jitter)
        .take(config.max_retries);

    debug!("Starting operation: {} (max_retries: {})", operation_name, config.max_retries);

    let result = Retry::spawn(retry_strategy, || async {
        match operation().await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Operation {} failed: {}", operation_name, e);
                Err(e)
            }
        }
    }).await;

    if let Err(e) = &result {
        if config.max_retries > 0 {
            error!("Operation {} failed after {} retries: {}", operation_name, config.max_retries, e);
        }
    }

    result
}

/// Timeout wrapper for operations
pub async fn with_timeout<F, T>(
    future: F,
    timeout: Duration,
    operation_name: &str,
) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            error!("Operation {} timed out after {:?}", operation_name, timeout);
            Err(AppError::TimeoutError(format!("Operation {} timed out", operation_name)))
        }
    }
}
