pub mod config;
pub mod models;
pub mod services;
pub mod handlers;
pub mod utils;
pub mod error;

pub use error::types::*;

use std::sync::Arc;

use crate::config::Settings;
use crate::services::risk_evaluator::RiskEvaluator;
use crate::utils::monitoring::ServiceMetrics;

/// Shared state handed to every axum handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub evaluator: Arc<RiskEvaluator>,
    pub metrics: Arc<ServiceMetrics>,
}
