use log::debug;
use smallvec::SmallVec;

use crate::cache::decode::Geometry;
use crate::cache::level::CacheLevel;
use crate::cache::types::LevelId;

/// Keeps the L1s a subset of the L2 by back-invalidating any L1 copy of a
/// block the L2 just replaced.
///
/// The L2 tag and set are first widened back into a full block address,
/// which is then re-decoded with each L1's own geometry. Shifting the L2 tag
/// directly would only be correct when both levels split the address the
/// same way.
pub struct InclusionEnforcer<'a> {
    l2: &'a Geometry,
}

impl<'a> InclusionEnforcer<'a> {
    pub fn new(l2: &'a Geometry) -> Self {
        Self { l2 }
    }

    pub fn block_address(&self, evicted_tag: u64, l2_set: usize) -> u64 {
        self.l2.block_address(evicted_tag, l2_set)
    }

    /// Probes every L1 in `l1s` and drops the block where present. LRU order
    /// of the affected sets is untouched. Returns the levels that lost a line.
    pub fn back_invalidate(
        &self,
        evicted_tag: u64,
        l2_set: usize,
        l1s: &mut [&mut CacheLevel],
    ) -> SmallVec<[LevelId; 2]> {
        let block = self.block_address(evicted_tag, l2_set);
        let mut hit = SmallVec::new();
        for l1 in l1s.iter_mut() {
            if l1.invalidate(block) {
                debug!("{}: back-invalidated block {:#x}", l1.id(), block);
                hit.push(l1.id());
            }
        }
        hit
    }
}
