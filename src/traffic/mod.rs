pub mod config;
pub mod patterns;

pub use config::{TrafficConfig, TrafficPatternSpec};
pub use patterns::{CompiledPattern, PatternEngine};
