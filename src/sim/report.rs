use anyhow::Context;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::cache::{LevelId, LevelSummary};
use crate::sim::top::SimSummary;

fn write_level(f: &mut fmt::Formatter<'_>, level: &LevelSummary) -> fmt::Result {
    let c = &level.counters;
    writeln!(f, "{}", level.level)?;
    writeln!(f, "  Refs:           {:>10}", c.references)?;
    writeln!(f, "  Misses:         {:>10}", c.misses)?;
    writeln!(f, "  Penalties:      {:>10}", c.penalties)?;
    writeln!(f, "  Invalidations:  {:>10}", c.invalidations)?;
    writeln!(f, "  Miss Rate:      {:>9.2}%", level.miss_rate * 100.0)?;
    writeln!(f, "  Avg Penalty:    {:>10.2}", level.avg_miss_penalty)?;
    writeln!(f, "  Avg Access:     {:>10.2}", level.avg_access_time)
}

impl fmt::Display for SimSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-----------------------------")?;
        writeln!(f, "Total Memory Accesses: {:>10}", self.total_references)?;
        writeln!(f, "Total Access Cycles:   {:>10}", self.total_cycles)?;
        writeln!(f, "AMAT:                  {:>10.2}", self.amat)?;
        writeln!(f, "Inclusive L2:          {:>10}", self.inclusive)?;
        writeln!(f, "-----------------------------")?;
        for id in LevelId::ALL {
            write_level(f, self.levels.level(id))?;
        }
        write!(f, "-----------------------------")
    }
}

/// Writes the summary as pretty-printed JSON, creating parent directories.
pub fn write_summary_json(path: &Path, summary: &SimSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let payload = serde_json::to_string_pretty(summary)?;
    fs::write(path, payload).with_context(|| format!("cannot write {}", path.display()))
}
