use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use super::Coordinate;
use crate::error::PredictorError;

/// Flood risk band derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    /// Lower bounds are inclusive: 80 is EXTREME, 79.99 is HIGH.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Extreme
        } else if score >= 60.0 {
            RiskLevel::High
        } else if score >= 40.0 {
            RiskLevel::Medium
        } else if score >= 20.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Extreme => "EXTREME",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MINIMAL" => Ok(RiskLevel::Minimal),
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            "EXTREME" => Ok(RiskLevel::Extreme),
            other => Err(PredictorError::MalformedResponse {
                message: format!("unknown risk level {:?}", other),
            }),
        }
    }
}

/// Which strategy produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentSource {
    MlService,
    Fallback,
}

impl AssessmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentSource::MlService => "ml_service",
            AssessmentSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub latitude: f64,
    pub longitude: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
    pub source: AssessmentSource,
    pub timestamp: DateTime<Utc>,
}

/// Raw payload returned by the ML service's `/predict` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    pub risk_score: f64,
    pub risk_level: String,
    #[serde(default)]
    pub factors: Vec<String>,
}

impl RiskAssessment {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Validate an ML prediction and turn it into an assessment.
    ///
    /// The score is clamped into 0-100. A non-finite score or an unknown level
    /// label is reported as a malformed response.
    pub fn from_prediction(
        coordinate: Coordinate,
        prediction: MlPrediction,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, PredictorError> {
        if !prediction.risk_score.is_finite() {
            return Err(PredictorError::MalformedResponse {
                message: format!("risk_score is not finite: {}", prediction.risk_score),
            });
        }
        let risk_level = prediction.risk_level.parse::<RiskLevel>()?;

        Ok(Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            risk_score: prediction.risk_score.clamp(0.0, 100.0),
            risk_level,
            factors: prediction.factors,
            source: AssessmentSource::MlService,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries_are_inclusive() {
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Extreme);
        assert_eq!(RiskLevel::from_score(79.999), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(60.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(40.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(20.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19.9), RiskLevel::Minimal);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Minimal);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!(" extreme ".parse::<RiskLevel>().unwrap(), RiskLevel::Extreme);
        assert!("SEVERE".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_level_serializes_uppercase() {
        let json = serde_json::to_string(&RiskLevel::Minimal).unwrap();
        assert_eq!(json, "\"MINIMAL\"");
    }

    #[test]
    fn test_from_prediction_clamps_score() {
        let prediction = MlPrediction {
            risk_score: 140.0,
            risk_level: "EXTREME".to_string(),
            factors: vec!["Heavy precipitation".to_string()],
        };
        let assessment = RiskAssessment::from_prediction(Coordinate::new(1.0, 2.0), prediction, Utc::now()).unwrap();
        assert_eq!(assessment.risk_score, 100.0);
        assert_eq!(assessment.source, AssessmentSource::MlService);
        assert_eq!(assessment.factors, vec!["Heavy precipitation".to_string()]);
    }

    #[test]
    fn test_from_prediction_rejects_unknown_level() {
        let prediction = MlPrediction {
            risk_score: 50.0,
            risk_level: "MODERATE".to_string(),
            factors: vec![],
        };
        let result = RiskAssessment::from_prediction(Coordinate::new(1.0, 2.0), prediction, Utc::now());
        assert!(matches!(result, Err(PredictorError::MalformedResponse { .. })));
    }

    #[test]
    fn test_from_prediction_rejects_nan_score() {
        let prediction = MlPrediction {
            risk_score: f64::NAN,
            risk_level: "LOW".to_string(),
            factors: vec![],
        };
        let result = RiskAssessment::from_prediction(Coordinate::new(1.0, 2.0), prediction, Utc::now());
        assert!(result.is_err());
    }
}
