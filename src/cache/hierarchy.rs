use log::debug;

use crate::cache::config::HierarchyConfig;
use crate::cache::inclusion::InclusionEnforcer;
use crate::cache::level::{AccessOutcome, CacheLevel};
use crate::cache::stats::{HierarchyStats, StatisticsCollector};
use crate::cache::types::{AccessKind, LevelId};
use crate::error::CacheError;

/// Split I$/D$ in front of a unified L2$ and main memory.
///
/// Every call to [`Hierarchy::access`] is resolved completely, including any
/// back-invalidation, before it returns; nothing is in flight between calls.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    icache: CacheLevel,
    dcache: CacheLevel,
    l2cache: CacheLevel,
    inclusive: bool,
    mem_latency: u64,
    stats: StatisticsCollector,
}

impl Hierarchy {
    pub fn new(config: &HierarchyConfig) -> Result<Self, CacheError> {
        config.validate()?;
        let block = config.block_size;
        let icache = CacheLevel::new(LevelId::ICache, &config.icache, block)?;
        let dcache = CacheLevel::new(LevelId::DCache, &config.dcache, block)?;
        let l2cache = CacheLevel::new(LevelId::L2Cache, &config.l2cache, block)?;
        let stats = StatisticsCollector::new([
            icache.hit_time(),
            dcache.hit_time(),
            l2cache.hit_time(),
        ]);
        Ok(Self {
            icache,
            dcache,
            l2cache,
            inclusive: config.inclusive,
            mem_latency: config.mem_speed,
            stats,
        })
    }

    pub fn inclusive(&self) -> bool {
        self.inclusive
    }

    pub fn level(&self, id: LevelId) -> &CacheLevel {
        match id {
            LevelId::ICache => &self.icache,
            LevelId::DCache => &self.dcache,
            LevelId::L2Cache => &self.l2cache,
        }
    }

    fn l1_mut(&mut self, kind: AccessKind) -> &mut CacheLevel {
        match kind {
            AccessKind::Instruction => &mut self.icache,
            AccessKind::DataLoad | AccessKind::DataStore => &mut self.dcache,
        }
    }

    /// Runs one reference through the hierarchy and returns its cost in cycles.
    pub fn access(&mut self, addr: u64, kind: AccessKind) -> u64 {
        let l1_id = kind.l1();
        self.stats.record_reference(l1_id);

        let l1 = self.l1_mut(kind);
        let hit_time = l1.hit_time();
        if l1.access(addr).is_hit() {
            return hit_time;
        }

        self.stats.record_miss(l1_id);
        let l2_cycles = self.l2_access(addr);
        self.stats.record_penalty(l1_id, l2_cycles);
        debug!("{kind} {addr:#x}: {l1_id} miss, {l2_cycles} cycles below");
        l2_cycles + hit_time
    }

    fn l2_access(&mut self, addr: u64) -> u64 {
        self.stats.record_reference(LevelId::L2Cache);
        match self.l2cache.access(addr) {
            AccessOutcome::Hit => self.l2cache.hit_time(),
            AccessOutcome::Miss { set, evicted } => {
                self.stats.record_miss(LevelId::L2Cache);
                self.stats.record_penalty(LevelId::L2Cache, self.mem_latency);
                if let Some(tag) = evicted {
                    self.enforce_inclusion(tag, set);
                }
                self.mem_latency + self.l2cache.hit_time()
            }
        }
    }

    fn enforce_inclusion(&mut self, evicted_tag: u64, l2_set: usize) {
        if !self.inclusive {
            return;
        }
        let enforcer = InclusionEnforcer::new(self.l2cache.geometry());
        let lost =
            enforcer.back_invalidate(evicted_tag, l2_set, &mut [&mut self.icache, &mut self.dcache]);
        for level in lost {
            self.stats.record_invalidation(level);
        }
    }

    pub fn stats(&self) -> HierarchyStats {
        self.stats.snapshot()
    }

    pub fn collector(&self) -> &StatisticsCollector {
        &self.stats
    }

    /// Empties every level and zeroes the counters; geometry is kept.
    pub fn reset(&mut self) {
        self.icache.invalidate_all();
        self.dcache.invalidate_all();
        self.l2cache.invalidate_all();
        self.stats.clear();
    }
}
