pub mod config;
pub mod decode;
pub mod hierarchy;
pub mod inclusion;
pub mod level;
pub mod set;
pub mod stats;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{HierarchyConfig, LevelConfig, MAX_LINES};
pub use decode::Geometry;
pub use hierarchy::Hierarchy;
pub use inclusion::InclusionEnforcer;
pub use level::{AccessOutcome, CacheLevel};
pub use set::{CacheSet, Way};
pub use stats::{HierarchyStats, LevelSummary, StatCounters, StatisticsCollector};
pub use types::{AccessKind, LevelId};
