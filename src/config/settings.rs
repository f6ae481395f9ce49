use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub weather: WeatherSettings,
    pub ml_service: MlServiceSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlServiceSettings {
    pub url: String,
    pub timeout_seconds: u64,
    pub retry_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub freshness_window_seconds: u64,
    pub sweep_interval_seconds: u64,
    /// `None` leaves the caches unbounded so that only the sweep evicts.
    pub max_capacity: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api: ApiSettings::default(),
            weather: WeatherSettings::default(),
            ml_service: MlServiceSettings::default(),
            cache: CacheSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for WeatherSettings {
    fn default() -> Self {
        WeatherSettings {
            url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            api_key: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl Default for MlServiceSettings {
    fn default() -> Self {
        MlServiceSettings {
            url: "http://localhost:5000".to_string(),
            timeout_seconds: 5,
            retry_attempts: 0,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            freshness_window_seconds: 900, // 15 minutes
            sweep_interval_seconds: 900,
            max_capacity: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
        }
    }
}

impl WeatherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl MlServiceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl CacheSettings {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Settings {
    /// Load settings from the process environment, falling back to defaults
    /// for anything unset. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn new() -> Result<Self, AppError> {
        let source = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        let lookup = |key: &str| -> Option<String> {
            env::var(key)
                .ok()
                .or_else(|| source.get_string(&key.to_lowercase()).ok())
        };
        Self::from_lookup(lookup)
    }

    /// Build settings from an arbitrary key lookup. Used by `new` and by tests
    /// that must not touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let settings = Settings {
            api: ApiSettings {
                host: lookup("API_HOST").unwrap_or(defaults.api.host),
                port: parse_or("API_PORT", &lookup, defaults.api.port)?,
            },
            weather: WeatherSettings {
                url: lookup("WEATHER_API_URL").unwrap_or(defaults.weather.url),
                api_key: lookup("WEATHER_API_KEY").unwrap_or(defaults.weather.api_key),
                timeout_seconds: parse_or("WEATHER_API_TIMEOUT", &lookup, defaults.weather.timeout_seconds)?,
            },
            ml_service: MlServiceSettings {
                url: lookup("ML_SERVICE_URL").unwrap_or(defaults.ml_service.url),
                timeout_seconds: parse_or("ML_SERVICE_TIMEOUT", &lookup, defaults.ml_service.timeout_seconds)?,
                retry_attempts: parse_or("ML_SERVICE_RETRY_ATTEMPTS", &lookup, defaults.ml_service.retry_attempts)?,
            },
            cache: CacheSettings {
                freshness_window_seconds: parse_or(
                    "CACHE_FRESHNESS_SECONDS",
                    &lookup,
                    defaults.cache.freshness_window_seconds,
                )?,
                sweep_interval_seconds: parse_or(
                    "CACHE_SWEEP_INTERVAL_SECONDS",
                    &lookup,
                    defaults.cache.sweep_interval_seconds,
                )?,
                max_capacity: match lookup("CACHE_MAX_CAPACITY") {
                    Some(raw) => Some(parse_value("CACHE_MAX_CAPACITY", &raw)?),
                    None => defaults.cache.max_capacity,
                },
            },
            logging: LoggingSettings {
                level: lookup("LOG_LEVEL").unwrap_or(defaults.logging.level),
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.weather.url.trim().is_empty() {
            return Err(AppError::ConfigError("WEATHER_API_URL must not be empty".to_string()));
        }
        if self.ml_service.url.trim().is_empty() {
            return Err(AppError::ConfigError("ML_SERVICE_URL must not be empty".to_string()));
        }
        if self.weather.timeout_seconds == 0 || self.ml_service.timeout_seconds == 0 {
            return Err(AppError::ConfigError("external call timeouts must be at least one second".to_string()));
        }
        if self.cache.freshness_window_seconds == 0 {
            return Err(AppError::ConfigError("CACHE_FRESHNESS_SECONDS must be positive".to_string()));
        }
        if self.cache.sweep_interval_seconds == 0 {
            return Err(AppError::ConfigError("CACHE_SWEEP_INTERVAL_SECONDS must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::ConfigError(format!("{} has an invalid value: {:?}", key, raw)))
}
