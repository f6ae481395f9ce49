use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::MlServiceSettings;
use crate::error::{AppError, PredictorError};
use crate::models::{MlPrediction, PredictionFeatures};
use crate::utils::fault_tolerance::{retry_with_backoff, RetryConfig};

/// External flood risk predictor. May be unavailable at any time.
#[async_trait]
pub trait RiskPredictor: Send + Sync {
    async fn predict(&self, features: &PredictionFeatures) -> Result<MlPrediction, PredictorError>;

    /// Whether the predictor currently answers its health probe
    async fn health_check(&self) -> bool;
}

/// Client for the Python ML microservice
#[derive(Clone)]
pub struct MlServiceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    retry_config: RetryConfig,
}

/// Request payload for `/predict`
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    weather: &'a PredictionFeatures,
}

impl MlServiceClient {
    pub fn new(base_url: String, timeout: Duration, retry_config: RetryConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build ML service HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            retry_config,
        })
    }

    pub fn from_settings(settings: &MlServiceSettings) -> Result<Self, AppError> {
        Self::new(
            settings.url.clone(),
            settings.timeout(),
            RetryConfig::ml_service(settings.retry_attempts),
        )
    }

    fn classify(&self, err: reqwest::Error) -> PredictorError {
        if err.is_timeout() {
            PredictorError::Timeout { seconds: self.timeout.as_secs() }
        } else {
            PredictorError::from(err)
        }
    }

    async fn predict_once(&self, features: &PredictionFeatures) -> Result<MlPrediction, PredictorError> {
        let url = format!("{}/predict", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { weather: features })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PredictorError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice::<MlPrediction>(&bytes).map_err(|e| PredictorError::MalformedResponse {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RiskPredictor for MlServiceClient {
    async fn predict(&self, features: &PredictionFeatures) -> Result<MlPrediction, PredictorError> {
        retry_with_backoff(
            || self.predict_once(features),
            self.retry_config.clone(),
            "ml_service_predict",
        )
        .await
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("ML service health check failed: {}", e);
                false
            }
        }
    }
}
