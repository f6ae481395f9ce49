#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flood_risk_monitor::{
    error::{AppError, PredictorError},
    models::{Coordinate, MlPrediction, PredictionFeatures, WeatherReading},
    services::{RiskEvaluator, RiskPredictor, WeatherSource},
    utils::{CacheConfig, CacheManager, ManualClock, ServiceMetrics},
};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 3, 9, 30, 0).unwrap()
}

/// Weather source returning a configurable reading and counting calls
pub struct CountingWeather {
    pub calls: AtomicUsize,
    reading: Mutex<WeatherFields>,
    fail: Mutex<bool>,
    delay: Option<Duration>,
}

#[derive(Clone, Copy)]
pub struct WeatherFields {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
}

pub const STORM: WeatherFields = WeatherFields {
    temperature: Some(2.0),
    humidity: Some(90.0),
    precipitation: Some(15.0),
    wind_speed: Some(25.0),
};

pub const MILD: WeatherFields = WeatherFields {
    temperature: Some(18.0),
    humidity: Some(50.0),
    precipitation: Some(0.0),
    wind_speed: Some(5.0),
};

impl CountingWeather {
    pub fn new(fields: WeatherFields) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reading: Mutex::new(fields),
            fail: Mutex::new(false),
            delay: None,
        }
    }

    pub fn slow(fields: WeatherFields, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(fields)
        }
    }

    pub fn set_fields(&self, fields: WeatherFields) {
        *self.reading.lock().unwrap() = fields;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for CountingWeather {
    async fn fetch(&self, coordinate: &Coordinate) -> Result<WeatherReading, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail.lock().unwrap() {
            return Err(AppError::ExternalApiError("Weather API returned 503".to_string()));
        }
        let fields = *self.reading.lock().unwrap();
        Ok(WeatherReading {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            temperature: fields.temperature,
            humidity: fields.humidity,
            precipitation: fields.precipitation,
            wind_speed: fields.wind_speed,
            // Deliberately old; the evaluator restamps readings on fetch
            timestamp: Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap(),
        })
    }
}

pub enum PredictorMode {
    Answer(MlPrediction),
    Fail(PredictorError),
    Hang(Duration),
}

/// Predictor with scripted behaviour that records what it was asked
pub struct ScriptedPredictor {
    pub calls: AtomicUsize,
    mode: Mutex<PredictorMode>,
    pub last_features: Mutex<Option<PredictionFeatures>>,
    healthy: bool,
}

impl ScriptedPredictor {
    pub fn answering(score: f64, level: &str, factors: &[&str]) -> Self {
        Self::with_mode(PredictorMode::Answer(MlPrediction {
            risk_score: score,
            risk_level: level.to_string(),
            factors: factors.iter().map(|f| f.to_string()).collect(),
        }))
    }

    pub fn failing() -> Self {
        Self::with_mode(PredictorMode::Fail(PredictorError::Unavailable {
            message: "connection refused".to_string(),
        }))
    }

    pub fn hanging(duration: Duration) -> Self {
        Self::with_mode(PredictorMode::Hang(duration))
    }

    fn with_mode(mode: PredictorMode) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            mode: Mutex::new(mode),
            last_features: Mutex::new(None),
            healthy: true,
        }
    }

    /// Same behaviour, but the health probe reports the service as down
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn set_mode(&self, mode: PredictorMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskPredictor for ScriptedPredictor {
    async fn predict(&self, features: &PredictionFeatures) -> Result<MlPrediction, PredictorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_features.lock().unwrap() = Some(features.clone());

        let outcome = match &*self.mode.lock().unwrap() {
            PredictorMode::Answer(prediction) => Ok(Ok(prediction.clone())),
            PredictorMode::Fail(error) => Ok(Err(error.clone())),
            PredictorMode::Hang(duration) => Err(*duration),
        };

        match outcome {
            Ok(result) => result,
            Err(duration) => {
                tokio::time::sleep(duration).await;
                Err(PredictorError::Unavailable {
                    message: "hung".to_string(),
                })
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

pub struct Harness {
    pub evaluator: Arc<RiskEvaluator>,
    pub weather: Arc<CountingWeather>,
    pub predictor: Arc<ScriptedPredictor>,
    pub clock: Arc<ManualClock>,
    pub metrics: Arc<ServiceMetrics>,
}

pub fn harness(weather: CountingWeather, predictor: ScriptedPredictor) -> Harness {
    let weather = Arc::new(weather);
    let predictor = Arc::new(predictor);
    let clock = Arc::new(ManualClock::new(t0()));
    let metrics = Arc::new(ServiceMetrics::new().unwrap());
    let cache = Arc::new(CacheManager::new(CacheConfig::default()).unwrap());

    let evaluator = RiskEvaluator::new(cache, weather.clone(), predictor.clone(), metrics.clone())
        .with_clock(clock.clone());

    Harness {
        evaluator: Arc::new(evaluator),
        weather,
        predictor,
        clock,
        metrics,
    }
}
