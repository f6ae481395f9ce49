use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, PredictorError};
use crate::models::{Coordinate, PredictionFeatures, RiskAssessment, WeatherReading};
use crate::services::ml_client::RiskPredictor;
use crate::services::risk_calculator::RiskCalculator;
use crate::services::weather_service::WeatherSource;
use crate::utils::caching::{CacheLookup, CacheManager, CacheStats};
use crate::utils::fault_tolerance::with_timeout;
use crate::utils::monitoring::ServiceMetrics;
use crate::utils::time::{Clock, SystemClock};

/// Upper bounds on the two external calls
#[derive(Debug, Clone)]
pub struct EvaluatorTimeouts {
    pub weather: Duration,
    pub predictor: Duration,
}

impl Default for EvaluatorTimeouts {
    fn default() -> Self {
        Self {
            weather: Duration::from_secs(10),
            predictor: Duration::from_secs(5),
        }
    }
}

/// Produces weather readings and flood risk assessments for coordinates.
///
/// Both results are cached per coordinate for the caches' freshness window.
/// A risk refresh first asks the ML predictor and falls back to
/// [`RiskCalculator`] on any predictor failure, so only weather failures ever
/// reach the caller.
pub struct RiskEvaluator {
    cache: Arc<CacheManager>,
    weather_source: Arc<dyn WeatherSource>,
    predictor: Arc<dyn RiskPredictor>,
    calculator: RiskCalculator,
    clock: Arc<dyn Clock>,
    metrics: Arc<ServiceMetrics>,
    timeouts: EvaluatorTimeouts,
}

impl RiskEvaluator {
    pub fn new(
        cache: Arc<CacheManager>,
        weather_source: Arc<dyn WeatherSource>,
        predictor: Arc<dyn RiskPredictor>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            cache,
            weather_source,
            predictor,
            calculator: RiskCalculator::new(),
            clock: Arc::new(SystemClock),
            metrics,
            timeouts: EvaluatorTimeouts::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeouts(mut self, timeouts: EvaluatorTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Current weather for `coordinate`, from cache when fresh.
    pub async fn get_weather(&self, coordinate: Coordinate) -> Result<WeatherReading, AppError> {
        let key = coordinate.cache_key();
        let lookup = self.cache.weather_cache.get(&key, self.clock.now()).await;
        self.metrics.record_cache_lookup("weather", lookup.outcome());

        if let CacheLookup::Fresh(reading) = lookup {
            return Ok(reading);
        }

        info!("Fetching weather for {}", coordinate);
        let fetched = with_timeout(
            self.weather_source.fetch(&coordinate),
            self.timeouts.weather,
            "weather_fetch",
        )
        .await;

        let fetched = match fetched {
            Ok(reading) => {
                self.metrics.record_weather_fetch("success");
                reading
            }
            Err(e) => {
                self.metrics.record_weather_fetch("failure");
                error!("Weather fetch for {} failed: {}", coordinate, e);
                return Err(e);
            }
        };

        let now = self.clock.now();
        let reading = fetched.captured_at(now);
        self.cache.weather_cache.insert(&key, reading.clone(), now).await;

        Ok(reading)
    }

    /// Flood risk for `coordinate`, from cache when fresh.
    ///
    /// Fails only when fresh weather is needed and cannot be fetched.
    pub async fn assess_risk(&self, coordinate: Coordinate) -> Result<RiskAssessment, AppError> {
        let key = coordinate.cache_key();
        let lookup = self.cache.risk_cache.get(&key, self.clock.now()).await;
        self.metrics.record_cache_lookup("flood_risk", lookup.outcome());

        if let CacheLookup::Fresh(assessment) = lookup {
            return Ok(assessment);
        }

        let weather = self.get_weather(coordinate).await?;

        let assessment = match self.predict(coordinate, &weather).await {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!("ML prediction for {} unavailable, using fallback scoring: {}", coordinate, e);
                self.metrics.record_predictor_failure(e.reason());
                RiskAssessment {
                    timestamp: self.clock.now(),
                    ..self.calculator.assess(&weather)
                }
            }
        };

        debug!(
            "Assessed {} as {} ({:.1}) via {}",
            coordinate,
            assessment.risk_level,
            assessment.risk_score,
            assessment.source.as_str()
        );
        self.metrics.record_assessment(assessment.source.as_str());
        self.cache
            .risk_cache
            .insert(&key, assessment.clone(), assessment.timestamp)
            .await;

        Ok(assessment)
    }

    /// Drop every cached reading and assessment, fresh or not.
    pub fn sweep_stale_entries(&self) {
        self.cache.clear_all();
        self.metrics.record_sweep();
    }

    pub async fn cache_stats(&self) -> Vec<CacheStats> {
        self.cache.get_all_stats().await
    }

    pub async fn predictor_available(&self) -> bool {
        self.predictor.health_check().await
    }

    async fn predict(&self, coordinate: Coordinate, weather: &WeatherReading) -> Result<RiskAssessment, PredictorError> {
        let features = PredictionFeatures::from(weather);

        let prediction = tokio::time::timeout(self.timeouts.predictor, self.predictor.predict(&features))
            .await
            .map_err(|_| PredictorError::Timeout {
                seconds: self.timeouts.predictor.as_secs(),
            })??;

        RiskAssessment::from_prediction(coordinate, prediction, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use crate::models::{AssessmentSource, MlPrediction};
    use crate::utils::caching::CacheConfig;

    struct FixedWeather;

    #[async_trait]
    impl WeatherSource for FixedWeather {
        async fn fetch(&self, coordinate: &Coordinate) -> Result<WeatherReading, AppError> {
            Ok(WeatherReading {
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
                temperature: Some(12.0),
                humidity: Some(70.0),
                precipitation: Some(3.0),
                wind_speed: Some(8.0),
                timestamp: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
            })
        }
    }

    struct MalformedPredictor;

    #[async_trait]
    impl RiskPredictor for MalformedPredictor {
        async fn predict(&self, _features: &PredictionFeatures) -> Result<MlPrediction, PredictorError> {
            Ok(MlPrediction {
                risk_score: 55.0,
                risk_level: "SEVERE".to_string(),
                factors: vec![],
            })
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    fn evaluator(predictor: Arc<dyn RiskPredictor>) -> RiskEvaluator {
        RiskEvaluator::new(
            Arc::new(CacheManager::new(CacheConfig::default()).unwrap()),
            Arc::new(FixedWeather),
            predictor,
            Arc::new(ServiceMetrics::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_weather_is_restamped_on_fetch() {
        let evaluator = evaluator(Arc::new(MalformedPredictor));
        let before = Utc::now();
        let reading = evaluator.get_weather(Coordinate::new(1.0, 2.0)).await.unwrap();
        assert!(reading.timestamp >= before);
    }

    #[tokio::test]
    async fn test_unknown_level_label_falls_back() {
        let evaluator = evaluator(Arc::new(MalformedPredictor));
        let assessment = evaluator.assess_risk(Coordinate::new(1.0, 2.0)).await.unwrap();

        // 12 + 14 + 4 + 0
        assert_eq!(assessment.source, AssessmentSource::Fallback);
        assert!((assessment.risk_score - 30.0).abs() < 1e-9);
        assert_eq!(evaluator.metrics.predictor_failures_for("malformed"), 1);
    }
}
