pub mod weather_service;
pub mod ml_client;
pub mod risk_calculator;
pub mod risk_evaluator;
pub mod cache_sweeper;

pub use weather_service::*;
pub use ml_client::*;
pub use risk_calculator::*;
pub use risk_evaluator::*;
pub use cache_sweeper::*;
