use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::WeatherSettings;
use crate::error::AppError;
use crate::models::{Coordinate, WeatherReading};

/// Provider of current weather readings for a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, coordinate: &Coordinate) -> Result<WeatherReading, AppError>;
}

/// OpenWeatherMap "current weather" client, metric units.
///
/// Makes a single attempt per call; failures are returned to the caller.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: Option<MainBlock>,
    wind: Option<WindBlock>,
    rain: Option<RainBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl OpenWeatherClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build weather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn from_settings(settings: &WeatherSettings) -> Result<Self, AppError> {
        Self::new(settings.url.clone(), settings.api_key.clone(), settings.timeout())
    }

    fn request_url(&self, coordinate: &Coordinate) -> Result<Url, AppError> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )
        .map_err(|e| AppError::ConfigError(format!("Invalid weather API URL {:?}: {}", self.base_url, e)))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch(&self, coordinate: &Coordinate) -> Result<WeatherReading, AppError> {
        let url = self.request_url(coordinate)?;
        debug!("Fetching weather for {}", coordinate);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Weather API returned {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<CurrentWeatherResponse>()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Failed to parse weather response: {}", e)))?;

        let (temperature, humidity) = body
            .main
            .map(|main| (main.temp, main.humidity))
            .unwrap_or((None, None));

        Ok(WeatherReading {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            temperature,
            humidity,
            precipitation: body.rain.and_then(|rain| rain.one_hour),
            wind_speed: body.wind.and_then(|wind| wind.speed),
            timestamp: Utc::now(),
        })
    }
}
