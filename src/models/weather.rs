use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::Coordinate;

/// Meteorological readings for one coordinate at one capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity, 0-100
    pub humidity: Option<f64>,
    /// Millimetres over the last hour
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl WeatherReading {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Copy of this reading captured at `timestamp`.
    pub fn captured_at(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }
}

/// Feature vector sent to the ML predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFeatures {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl From<&WeatherReading> for PredictionFeatures {
    fn from(reading: &WeatherReading) -> Self {
        Self {
            temperature: reading.temperature,
            humidity: reading.humidity,
            precipitation: reading.precipitation,
            wind_speed: reading.wind_speed,
        }
    }
}
