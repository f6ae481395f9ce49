// Failure modes at the ML predictor boundary
use thiserror::Error;

/// Every variant is recovered by the fallback scorer; none reach API callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    #[error("ML service unreachable: {message}")]
    Unavailable { message: String },

    #[error("ML service timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("ML service returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Malformed ML response: {message}")]
    MalformedResponse { message: String },
}

impl PredictorError {
    /// Short label used for the failure counter
    pub fn reason(&self) -> &'static str {
        match self {
            PredictorError::Unavailable { .. } => "unavailable",
            PredictorError::Timeout { .. } => "timeout",
            PredictorError::BadStatus { .. } => "bad_status",
            PredictorError::MalformedResponse { .. } => "malformed",
        }
    }
}

impl From<reqwest::Error> for PredictorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PredictorError::MalformedResponse { message: err.to_string() }
        } else {
            PredictorError::Unavailable { message: err.to_string() }
        }
    }
}
