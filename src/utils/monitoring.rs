use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::AppError;

/// Prometheus counters for the weather and flood risk pipeline.
///
/// Each instance owns its own registry so tests can build as many as they like.
pub struct ServiceMetrics {
    registry: Registry,
    cache_lookups: IntCounterVec,
    weather_fetches: IntCounterVec,
    assessments: IntCounterVec,
    predictor_failures: IntCounterVec,
    cache_sweeps: IntCounter,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let cache_lookups = IntCounterVec::new(
            Opts::new("flood_cache_lookups_total", "Cache lookups by cache and outcome"),
            &["cache", "outcome"],
        )?;
        let weather_fetches = IntCounterVec::new(
            Opts::new("flood_weather_fetches_total", "Weather source fetches by outcome"),
            &["outcome"],
        )?;
        let assessments = IntCounterVec::new(
            Opts::new("flood_assessments_total", "Computed risk assessments by source"),
            &["source"],
        )?;
        let predictor_failures = IntCounterVec::new(
            Opts::new("flood_predictor_failures_total", "ML predictor failures by reason"),
            &["reason"],
        )?;
        let cache_sweeps = IntCounter::new("flood_cache_sweeps_total", "Full cache sweeps")?;

        registry.register(Box::new(cache_lookups.clone()))?;
        registry.register(Box::new(weather_fetches.clone()))?;
        registry.register(Box::new(assessments.clone()))?;
        registry.register(Box::new(predictor_failures.clone()))?;
        registry.register(Box::new(cache_sweeps.clone()))?;

        Ok(Self {
            registry,
            cache_lookups,
            weather_fetches,
            assessments,
            predictor_failures,
            cache_sweeps,
        })
    }

    pub fn record_cache_lookup(&self, cache: &str, outcome: &str) {
        self.cache_lookups.with_label_values(&[cache, outcome]).inc();
    }

    pub fn record_weather_fetch(&self, outcome: &str) {
        self.weather_fetches.with_label_values(&[outcome]).inc();
    }

    pub fn record_assessment(&self, source: &str) {
        self.assessments.with_label_values(&[source]).inc();
    }

    pub fn record_predictor_failure(&self, reason: &str) {
        self.predictor_failures.with_label_values(&[reason]).inc();
    }

    pub fn record_sweep(&self) {
        self.cache_sweeps.inc();
    }

    pub fn assessments_from(&self, source: &str) -> u64 {
        self.assessments.with_label_values(&[source]).get()
    }

    pub fn predictor_failures_for(&self, reason: &str) -> u64 {
        self.predictor_failures.with_label_values(&[reason]).get()
    }

    pub fn sweeps(&self) -> u64 {
        self.cache_sweeps.get()
    }

    /// Render every metric in the Prometheus text format
    pub fn export_metrics(&self) -> Result<String, AppError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| AppError::InternalError(format!("metrics output is not UTF-8: {}", e)))
    }
}
