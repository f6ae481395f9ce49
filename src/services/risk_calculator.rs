use crate::models::{AssessmentSource, RiskAssessment, RiskLevel, WeatherReading};

pub const HEAVY_PRECIPITATION: &str = "Heavy precipitation";
pub const HIGH_HUMIDITY: &str = "High humidity";
pub const STRONG_WINDS: &str = "Strong winds";
pub const NEAR_FREEZING: &str = "Near-freezing temperatures";

/// Deterministic weather heuristic used when the ML service cannot answer.
///
/// Four bounded terms are summed and capped at 100:
/// precipitation up to 40, humidity up to 20, wind up to 20, and temperature
/// up to 20. The temperature term peaks at 0 °C and falls to zero at ±10 °C.
/// Missing readings contribute nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskCalculator;

impl RiskCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, reading: &WeatherReading) -> RiskAssessment {
        let risk_score = self.calculate_risk_score(reading);

        RiskAssessment {
            latitude: reading.latitude,
            longitude: reading.longitude,
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            factors: self.risk_factors(reading),
            source: AssessmentSource::Fallback,
            timestamp: reading.timestamp,
        }
    }

    pub fn calculate_risk_score(&self, reading: &WeatherReading) -> f64 {
        let mut score = 0.0;

        if let Some(precipitation) = reading.precipitation {
            score += (precipitation * 4.0).min(40.0);
        }

        if let Some(humidity) = reading.humidity {
            score += (humidity / 100.0) * 20.0;
        }

        if let Some(wind_speed) = reading.wind_speed {
            score += (wind_speed / 2.0).min(20.0);
        }

        // Scores highest at 0 °C. Kept as-is for compatibility with existing
        // assessments; it is not an established flood indicator.
        if let Some(temperature) = reading.temperature {
            score += (20.0 - temperature.abs() * 2.0).max(0.0);
        }

        score.min(100.0)
    }

    pub fn risk_factors(&self, reading: &WeatherReading) -> Vec<String> {
        let mut factors = Vec::new();

        if reading.precipitation.is_some_and(|p| p > 10.0) {
            factors.push(HEAVY_PRECIPITATION.to_string());
        }
        if reading.humidity.is_some_and(|h| h > 80.0) {
            factors.push(HIGH_HUMIDITY.to_string());
        }
        if reading.wind_speed.is_some_and(|w| w > 20.0) {
            factors.push(STRONG_WINDS.to_string());
        }
        if reading.temperature.is_some_and(|t| t.abs() < 5.0) {
            factors.push(NEAR_FREEZING.to_string());
        }

        factors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(
        temperature: Option<f64>,
        humidity: Option<f64>,
        precipitation: Option<f64>,
        wind_speed: Option<f64>,
    ) -> WeatherReading {
        WeatherReading {
            latitude: 52.37,
            longitude: 4.89,
            temperature,
            humidity,
            precipitation,
            wind_speed,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_storm_near_freezing() {
        let calculator = RiskCalculator::new();
        let storm = reading(Some(2.0), Some(90.0), Some(15.0), Some(25.0));

        // 40 + 18 + 12.5 + 16
        let assessment = calculator.assess(&storm);
        assert!((assessment.risk_score - 86.5).abs() < 1e-9);
        assert_eq!(assessment.risk_level, RiskLevel::Extreme);
        assert_eq!(
            assessment.factors,
            vec![HEAVY_PRECIPITATION, HIGH_HUMIDITY, STRONG_WINDS, NEAR_FREEZING]
        );
        assert_eq!(assessment.source, AssessmentSource::Fallback);
    }

    #[test]
    fn test_score_is_capped_at_100() {
        let calculator = RiskCalculator::new();
        let extreme = reading(Some(0.0), Some(100.0), Some(1000.0), Some(500.0));
        assert_eq!(calculator.calculate_risk_score(&extreme), 100.0);
    }

    #[test]
    fn test_missing_readings_contribute_nothing() {
        let calculator = RiskCalculator::new();
        let empty = reading(None, None, None, None);
        let assessment = calculator.assess(&empty);
        assert_eq!(assessment.risk_score, 0.0);
        assert_eq!(assessment.risk_level, RiskLevel::Minimal);
        assert!(assessment.factors.is_empty());
    }

    #[test]
    fn test_temperature_term_vanishes_beyond_ten_degrees() {
        let calculator = RiskCalculator::new();
        assert_eq!(calculator.calculate_risk_score(&reading(Some(25.0), None, None, None)), 0.0);
        assert_eq!(calculator.calculate_risk_score(&reading(Some(-10.0), None, None, None)), 0.0);
        assert_eq!(calculator.calculate_risk_score(&reading(Some(-3.0), None, None, None)), 14.0);
    }

    #[test]
    fn test_factor_thresholds_are_strict() {
        let calculator = RiskCalculator::new();
        let boundary = reading(Some(5.0), Some(80.0), Some(10.0), Some(20.0));
        assert!(calculator.risk_factors(&boundary).is_empty());
    }

    #[test]
    fn test_mild_day_is_minimal() {
        let calculator = RiskCalculator::new();
        // 0 + 10 + 2.5 + 0
        let mild = reading(Some(18.0), Some(50.0), Some(0.0), Some(5.0));
        let assessment = calculator.assess(&mild);
        assert!((assessment.risk_score - 12.5).abs() < 1e-9);
        assert_eq!(assessment.risk_level, RiskLevel::Minimal);
    }
}
