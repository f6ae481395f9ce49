pub mod time;
pub mod fault_tolerance;
pub mod monitoring;
pub mod caching;

pub use time::*;
pub use fault_tolerance::*;
pub use monitoring::*;
pub use caching::*;
