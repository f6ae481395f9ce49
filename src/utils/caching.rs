use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use chrono::{DateTime, Utc};

use crate::config::CacheSettings;
use crate::error::AppError;
use crate::models::{RiskAssessment, WeatherReading};
use crate::utils::time::is_within_window;

/// Cache configuration for one freshness-bounded cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub freshness_window: Duration,
    /// `None` means unbounded
    pub max_capacity: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(900), // 15 minutes
            max_capacity: None,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            freshness_window: settings.freshness_window(),
            max_capacity: settings.max_capacity,
        }
    }
}

/// A stored value together with the time it was captured
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
    pub value: T,
    pub captured_at: DateTime<Utc>,
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Fresh(T),
    /// Present but older than the freshness window; callers treat it as absent
    Stale,
    Miss,
}

impl<T> CacheLookup<T> {
    pub fn outcome(&self) -> &'static str {
        match self {
            CacheLookup::Fresh(_) => "hit",
            CacheLookup::Stale => "stale",
            CacheLookup::Miss => "miss",
        }
    }
}

/// In-memory cache whose entries expire by age on read.
///
/// Stale entries stay in memory until `clear` runs; a lookup simply refuses to
/// return them. Writes overwrite, so concurrent refreshes of one key resolve
/// last-writer-wins.
pub struct FreshnessCache<T> {
    entries: Cache<String, CachedEntry<T>>,
    freshness_window: chrono::Duration,
    config: CacheConfig,
    cache_name: String,
}

impl<T> FreshnessCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cache_name: &str, config: CacheConfig) -> Result<Self, AppError> {
        let freshness_window = chrono::Duration::from_std(config.freshness_window)
            .map_err(|e| AppError::ConfigError(format!("freshness window for {} is out of range: {}", cache_name, e)))?;

        let mut builder = Cache::builder();
        if let Some(capacity) = config.max_capacity {
            builder = builder.max_capacity(capacity);
        }
        let entries = builder.build();

        info!(
            "Cache '{}' initialized (freshness window: {}s, capacity: {})",
            cache_name,
            config.freshness_window.as_secs(),
            config.max_capacity.map(|c| c.to_string()).unwrap_or_else(|| "unbounded".to_string())
        );

        Ok(Self {
            entries,
            freshness_window,
            config,
            cache_name: cache_name.to_string(),
        })
    }

    /// Look up `key`, judging freshness against `now`
    pub async fn get(&self, key: &str, now: DateTime<Utc>) -> CacheLookup<T> {
        match self.entries.get(key).await {
            Some(entry) if is_within_window(entry.captured_at, now, self.freshness_window) => {
                debug!("Cache '{}' hit for {}", self.cache_name, key);
                CacheLookup::Fresh(entry.value)
            }
            Some(entry) => {
                debug!(
                    "Cache '{}' entry for {} is stale (captured at {})",
                    self.cache_name, key, entry.captured_at
                );
                CacheLookup::Stale
            }
            None => CacheLookup::Miss,
        }
    }

    /// Store `value` under `key`, replacing any previous entry
    pub async fn insert(&self, key: &str, value: T, captured_at: DateTime<Utc>) {
        self.entries
            .insert(key.to_string(), CachedEntry { value, captured_at })
            .await;
    }

    /// Drop every entry regardless of age
    pub fn clear(&self) {
        self.entries.invalidate_all();
        debug!("Cache '{}' cleared", self.cache_name);
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks().await;

        CacheStats {
            cache_name: self.cache_name.clone(),
            entries: self.entries.entry_count(),
            freshness_window_seconds: self.config.freshness_window.as_secs(),
            max_capacity: self.config.max_capacity,
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub cache_name: String,
    pub entries: u64,
    pub freshness_window_seconds: u64,
    pub max_capacity: Option<u64>,
}

/// The two caches owned by the risk evaluator
pub struct CacheManager {
    pub weather_cache: FreshnessCache<WeatherReading>,
    pub risk_cache: FreshnessCache<RiskAssessment>,
}

impl CacheManager {
    pub fn new(config: CacheConfig) -> Result<Self, AppError> {
        Ok(Self {
            weather_cache: FreshnessCache::new("weather", config.clone())?,
            risk_cache: FreshnessCache::new("flood_risk", config)?,
        })
    }

    pub fn from_settings(settings: &CacheSettings) -> Result<Self, AppError> {
        Self::new(CacheConfig::from(settings))
    }

    pub async fn get_all_stats(&self) -> Vec<CacheStats> {
        vec![
            self.weather_cache.stats().await,
            self.risk_cache.stats().await,
        ]
    }

    /// Clear both caches
    pub fn clear_all(&self) {
        self.weather_cache.clear();
        self.risk_cache.clear();
        info!("Weather and flood risk caches cleared");
    }
}
