pub mod coordinate;
pub mod weather;
pub mod risk_assessment;

pub use coordinate::*;
pub use weather::*;
pub use risk_assessment::*;
