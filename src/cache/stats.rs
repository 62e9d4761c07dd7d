use serde::Serialize;
use std::ops::AddAssign;

use crate::cache::types::LevelId;

/// Raw per-level counters. Hits are derived as `references - misses`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatCounters {
    pub references: u64,
    pub misses: u64,
    pub penalties: u64,
    pub invalidations: u64,
}

impl StatCounters {
    pub fn hits(&self) -> u64 {
        self.references.saturating_sub(self.misses)
    }

    pub fn miss_rate(&self) -> f64 {
        if self.references == 0 {
            0.0
        } else {
            self.misses as f64 / self.references as f64
        }
    }

    pub fn avg_miss_penalty(&self) -> f64 {
        if self.misses == 0 {
            0.0
        } else {
            self.penalties as f64 / self.misses as f64
        }
    }

    pub fn avg_access_time(&self, hit_time: u64) -> f64 {
        hit_time as f64 + self.miss_rate() * self.avg_miss_penalty()
    }
}

impl AddAssign<&StatCounters> for StatCounters {
    fn add_assign(&mut self, other: &StatCounters) {
        self.references = self.references.saturating_add(other.references);
        self.misses = self.misses.saturating_add(other.misses);
        self.penalties = self.penalties.saturating_add(other.penalties);
        self.invalidations = self.invalidations.saturating_add(other.invalidations);
    }
}

impl AddAssign<StatCounters> for StatCounters {
    fn add_assign(&mut self, other: StatCounters) {
        *self += &other;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: LevelId,
    pub hit_time: u64,
    #[serde(flatten)]
    pub counters: StatCounters,
    pub hits: u64,
    pub miss_rate: f64,
    pub avg_miss_penalty: f64,
    pub avg_access_time: f64,
}

impl LevelSummary {
    fn new(level: LevelId, hit_time: u64, counters: StatCounters) -> Self {
        Self {
            level,
            hit_time,
            counters,
            hits: counters.hits(),
            miss_rate: counters.miss_rate(),
            avg_miss_penalty: counters.avg_miss_penalty(),
            avg_access_time: counters.avg_access_time(hit_time),
        }
    }
}

/// Read-only snapshot of every level, taken after (or during) a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HierarchyStats {
    pub icache: LevelSummary,
    pub dcache: LevelSummary,
    pub l2cache: LevelSummary,
}

impl HierarchyStats {
    pub fn level(&self, level: LevelId) -> &LevelSummary {
        match level {
            LevelId::ICache => &self.icache,
            LevelId::DCache => &self.dcache,
            LevelId::L2Cache => &self.l2cache,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    counters: [StatCounters; 3],
    hit_times: [u64; 3],
}

impl StatisticsCollector {
    /// `hit_times` is indexed by [`LevelId::index`].
    pub fn new(hit_times: [u64; 3]) -> Self {
        Self {
            counters: [StatCounters::default(); 3],
            hit_times,
        }
    }

    pub fn record_reference(&mut self, level: LevelId) {
        let c = &mut self.counters[level.index()];
        c.references = c.references.saturating_add(1);
    }

    pub fn record_miss(&mut self, level: LevelId) {
        let c = &mut self.counters[level.index()];
        c.misses = c.misses.saturating_add(1);
    }

    pub fn record_penalty(&mut self, level: LevelId, cycles: u64) {
        let c = &mut self.counters[level.index()];
        c.penalties = c.penalties.saturating_add(cycles);
    }

    pub fn record_invalidation(&mut self, level: LevelId) {
        let c = &mut self.counters[level.index()];
        c.invalidations = c.invalidations.saturating_add(1);
    }

    pub fn counters(&self, level: LevelId) -> &StatCounters {
        &self.counters[level.index()]
    }

    pub fn miss_rate(&self, level: LevelId) -> f64 {
        self.counters(level).miss_rate()
    }

    pub fn average_access_time(&self, level: LevelId) -> f64 {
        self.counters(level)
            .avg_access_time(self.hit_times[level.index()])
    }

    pub fn summary(&self, level: LevelId) -> LevelSummary {
        LevelSummary::new(level, self.hit_times[level.index()], self.counters[level.index()])
    }

    pub fn snapshot(&self) -> HierarchyStats {
        HierarchyStats {
            icache: self.summary(LevelId::ICache),
            dcache: self.summary(LevelId::DCache),
            l2cache: self.summary(LevelId::L2Cache),
        }
    }

    pub fn clear(&mut self) {
        self.counters = [StatCounters::default(); 3];
    }
}
