use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair as supplied by the caller.
///
/// Values are not range-checked or normalized. `cache_key` uses the default
/// float formatting with no rounding, so `0.1 + 0.2` and `0.3` are different
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn cache_key(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}
