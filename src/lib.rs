pub mod cache;
pub mod error;
pub mod sim;
pub mod traffic;

pub use cache::{AccessKind, Hierarchy, HierarchyConfig, LevelConfig, LevelId};
pub use error::{CacheError, TraceError};
pub use sim::top::{Sim, SimSummary};
pub use sim::trace::{TraceReader, TraceRecord};
