pub mod types;
pub mod prediction;

pub use types::*;
pub use prediction::*;
