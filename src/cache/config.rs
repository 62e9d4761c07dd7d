use serde::Deserialize;
use std::str::FromStr;

use crate::error::CacheError;
use crate::sim::config::Config;

/// Upper bound on `sets * assoc` for one level.
pub const MAX_LINES: u64 = 1 << 24;

/// Geometry and timing of a single cache level.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    pub sets: u64,
    pub assoc: u64,
    pub hit_time: u64,
}

impl LevelConfig {
    pub fn new(sets: u64, assoc: u64, hit_time: u64) -> Self {
        Self {
            sets,
            assoc,
            hit_time,
        }
    }

    /// Total line count, or `None` if it overflows or exceeds [`MAX_LINES`].
    pub fn lines(&self) -> Option<u64> {
        self.sets
            .checked_mul(self.assoc)
            .filter(|&lines| lines <= MAX_LINES)
    }

    fn validate(&self, name: &str) -> Result<(), CacheError> {
        if !self.sets.is_power_of_two() {
            return Err(CacheError::InvalidConfiguration(format!(
                "{name}: set count {} is not a power of two",
                self.sets
            )));
        }
        if self.assoc == 0 {
            return Err(CacheError::InvalidConfiguration(format!(
                "{name}: associativity must be >= 1"
            )));
        }
        if self.lines().is_none() {
            return Err(CacheError::InvalidConfiguration(format!(
                "{name}: {} sets x {} ways exceeds {MAX_LINES} lines",
                self.sets, self.assoc
            )));
        }
        if self.hit_time == 0 {
            return Err(CacheError::InvalidConfiguration(format!(
                "{name}: hit time must be > 0"
            )));
        }
        Ok(())
    }
}

/// Accepts the compact `sets:assoc:hit_time` form, e.g. `512:4:2`.
impl FromStr for LevelConfig {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let fields = value
            .split(':')
            .map(|f| f.trim().parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| format!("'{value}': {err}"))?;
        match fields.as_slice() {
            &[sets, assoc, hit_time] => Ok(Self::new(sets, assoc, hit_time)),
            _ => Err(format!("'{value}': expected sets:assoc:hit_time")),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyConfig {
    pub icache: LevelConfig,
    pub dcache: LevelConfig,
    pub l2cache: LevelConfig,
    pub inclusive: bool,
    pub block_size: u64,
    pub mem_speed: u64,
}

impl Config for HierarchyConfig {
    const SECTION: &'static str = "cache";
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            icache: LevelConfig::new(512, 1, 2),
            dcache: LevelConfig::new(256, 4, 2),
            l2cache: LevelConfig::new(1024, 8, 10),
            inclusive: true,
            block_size: 64,
            mem_speed: 100,
        }
    }
}

impl HierarchyConfig {
    pub fn validate(&self) -> Result<(), CacheError> {
        self.icache.validate("icache")?;
        self.dcache.validate("dcache")?;
        self.l2cache.validate("l2cache")?;
        if !self.block_size.is_power_of_two() {
            return Err(CacheError::InvalidConfiguration(format!(
                "block size {} is not a power of two",
                self.block_size
            )));
        }
        if self.mem_speed == 0 {
            return Err(CacheError::InvalidConfiguration(
                "memory latency must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
