use log::debug;

use crate::cache::config::{LevelConfig, MAX_LINES};
use crate::cache::decode::Geometry;
use crate::cache::set::CacheSet;
use crate::cache::types::LevelId;
use crate::error::CacheError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    /// The block was installed in `set`, displacing `evicted` if that way
    /// held a valid line.
    Miss { set: usize, evicted: Option<u64> },
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit)
    }
}

#[derive(Debug, Clone)]
pub struct CacheLevel {
    id: LevelId,
    geometry: Geometry,
    hit_time: u64,
    sets: Vec<CacheSet>,
}

impl CacheLevel {
    pub fn new(id: LevelId, config: &LevelConfig, block_bytes: u64) -> Result<Self, CacheError> {
        let geometry = Geometry::new(block_bytes, config.sets)?;
        if config.lines().is_none() {
            return Err(CacheError::InvalidConfiguration(format!(
                "{id}: {} sets x {} ways exceeds {MAX_LINES} lines",
                config.sets, config.assoc
            )));
        }
        let assoc = usize::try_from(config.assoc)
            .ok()
            .filter(|&a| a >= 1)
            .ok_or_else(|| {
                CacheError::InvalidConfiguration(format!(
                    "{id}: associativity {} is out of range",
                    config.assoc
                ))
            })?;
        let sets = (0..geometry.sets()).map(|_| CacheSet::new(assoc)).collect();
        Ok(Self {
            id,
            geometry,
            hit_time: config.hit_time,
            sets,
        })
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn hit_time(&self) -> u64 {
        self.hit_time
    }

    pub fn set(&self, set: usize) -> &CacheSet {
        &self.sets[set]
    }

    /// Looks up `addr`, promoting it on a hit and replacing the set's LRU way
    /// on a miss. Only the one set `addr` maps to is mutated.
    pub fn access(&mut self, addr: u64) -> AccessOutcome {
        let (tag, set_idx) = self.geometry.decode(addr);
        let set = &mut self.sets[set_idx];
        if let Some(way) = set.find_way(tag) {
            set.touch(way);
            debug!("{}: hit {:#x} set {} way {}", self.id, addr, set_idx, way);
            return AccessOutcome::Hit;
        }
        let victim = set.victim_way();
        let evicted = set.install(victim, tag);
        debug!(
            "{}: miss {:#x} set {} way {} evicted {:?}",
            self.id, addr, set_idx, victim, evicted
        );
        AccessOutcome::Miss {
            set: set_idx,
            evicted,
        }
    }

    /// Drops the current LRU line of `set` and returns its tag.
    pub fn evict(&mut self, set: usize) -> Option<u64> {
        let set = &mut self.sets[set];
        let victim = set.victim_way();
        set.invalidate(victim)
    }

    /// True if the block holding `addr` is resident. Does not touch LRU state.
    pub fn probe(&self, addr: u64) -> bool {
        let (tag, set_idx) = self.geometry.decode(addr);
        self.sets[set_idx].find_way(tag).is_some()
    }

    /// Invalidates the block holding `addr`, if resident, without promoting it.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        let (tag, set_idx) = self.geometry.decode(addr);
        let set = &mut self.sets[set_idx];
        match set.find_way(tag) {
            Some(way) => set.invalidate(way).is_some(),
            None => false,
        }
    }

    pub fn invalidate_all(&mut self) {
        self.sets.iter_mut().for_each(CacheSet::invalidate_all);
    }

    /// Block addresses of every valid line, in set order.
    pub fn resident_blocks(&self) -> Vec<u64> {
        self.sets
            .iter()
            .enumerate()
            .flat_map(|(idx, set)| {
                set.resident_tags()
                    .map(move |tag| self.geometry.block_address(tag, idx))
            })
            .collect()
    }
}
