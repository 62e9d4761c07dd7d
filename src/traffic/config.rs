use serde::Deserialize;

use crate::sim::config::Config;

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TrafficConfig {
    pub enabled: bool,
    pub patterns: Vec<TrafficPatternSpec>,
}

impl Config for TrafficConfig {
    const SECTION: &'static str = "traffic";
}

/// One synthetic reference stream, as written in the `[[traffic.patterns]]`
/// array. Addresses are byte addresses.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TrafficPatternSpec {
    pub name: String,
    /// `sequential`, `strided` or `random`.
    pub kind: String,
    /// `instr`, `load` or `store`.
    pub op: String,
    pub base: u64,
    pub count: u32,
    pub stride: u64,
    /// Number of times the whole stream is replayed.
    pub repeat: u32,
    pub random_min: u64,
    pub random_max: u64,
    pub seed: u64,
}

impl Default for TrafficPatternSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: "sequential".to_string(),
            op: "load".to_string(),
            base: 0,
            count: 1024,
            stride: 4,
            repeat: 1,
            random_min: 0,
            random_max: 0,
            seed: 0,
        }
    }
}
