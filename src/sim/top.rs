use log::info;
use serde::Serialize;

use crate::cache::{Hierarchy, HierarchyConfig, HierarchyStats};
use crate::error::CacheError;
use crate::sim::trace::TraceRecord;

/// Totals over a whole trace plus the per-level snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimSummary {
    pub total_references: u64,
    pub total_cycles: u64,
    pub amat: f64,
    pub inclusive: bool,
    pub levels: HierarchyStats,
}

/// Batch driver: folds an ordered sequence of references over one hierarchy.
pub struct Sim {
    hierarchy: Hierarchy,
    total_references: u64,
    total_cycles: u64,
}

impl Sim {
    pub fn new(config: &HierarchyConfig) -> Result<Self, CacheError> {
        let hierarchy = Hierarchy::new(config)?;
        info!(
            "hierarchy: icache {:?} dcache {:?} l2cache {:?} block {}B mem {} cycles inclusive={}",
            config.icache,
            config.dcache,
            config.l2cache,
            config.block_size,
            config.mem_speed,
            config.inclusive
        );
        Ok(Self {
            hierarchy,
            total_references: 0,
            total_cycles: 0,
        })
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn step(&mut self, record: TraceRecord) -> u64 {
        let cycles = self.hierarchy.access(record.address, record.kind);
        self.total_references = self.total_references.saturating_add(1);
        self.total_cycles = self.total_cycles.saturating_add(cycles);
        cycles
    }

    /// Stops at the first failing record and returns its error.
    pub fn run<I, E>(&mut self, records: I) -> Result<SimSummary, E>
    where
        I: IntoIterator<Item = Result<TraceRecord, E>>,
    {
        for record in records {
            self.step(record?);
        }
        let summary = self.summary();
        info!(
            "simulated {} references in {} cycles",
            summary.total_references, summary.total_cycles
        );
        Ok(summary)
    }

    pub fn summary(&self) -> SimSummary {
        let amat = if self.total_references == 0 {
            0.0
        } else {
            self.total_cycles as f64 / self.total_references as f64
        };
        SimSummary {
            total_references: self.total_references,
            total_cycles: self.total_cycles,
            amat,
            inclusive: self.hierarchy.inclusive(),
            levels: self.hierarchy.stats(),
        }
    }

    pub fn reset(&mut self) {
        self.hierarchy.reset();
        self.total_references = 0;
        self.total_cycles = 0;
    }
}
