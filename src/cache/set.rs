use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Way {
    pub valid: bool,
    pub tag: u64,
}

/// One set of a set-associative tag array.
///
/// `lru` is a permutation of the way indices ordered most-recently-used
/// first; its last element is the next victim.
#[derive(Debug, Clone)]
pub struct CacheSet {
    ways: SmallVec<[Way; 8]>,
    lru: SmallVec<[usize; 8]>,
}

impl CacheSet {
    pub fn new(assoc: usize) -> Self {
        assert!(assoc >= 1, "associativity must be >= 1");
        Self {
            ways: SmallVec::from_elem(Way::default(), assoc),
            lru: (0..assoc).collect(),
        }
    }

    pub fn associativity(&self) -> usize {
        self.ways.len()
    }

    pub fn way(&self, way: usize) -> &Way {
        &self.ways[way]
    }

    pub fn lru_order(&self) -> &[usize] {
        &self.lru
    }

    /// Invalid ways never match, whatever tag they still hold.
    pub fn find_way(&self, tag: u64) -> Option<usize> {
        self.ways.iter().position(|w| w.valid && w.tag == tag)
    }

    pub fn touch(&mut self, way: usize) {
        let order = &mut self.lru;
        if let Some(pos) = order.iter().position(|&idx| idx == way) {
            order.remove(pos);
        }
        order.insert(0, way);
    }

    pub fn victim_way(&self) -> usize {
        *self.lru.last().unwrap_or(&0)
    }

    /// Fills `way` with `tag` and promotes it to MRU. Returns the tag that was
    /// displaced, if the way held a valid line.
    pub fn install(&mut self, way: usize, tag: u64) -> Option<u64> {
        let old = std::mem::replace(&mut self.ways[way], Way { valid: true, tag });
        self.touch(way);
        old.valid.then_some(old.tag)
    }

    /// Clears the valid bit of `way`. LRU order is left alone.
    pub fn invalidate(&mut self, way: usize) -> Option<u64> {
        let w = &mut self.ways[way];
        let was_valid = std::mem::replace(&mut w.valid, false);
        was_valid.then_some(w.tag)
    }

    pub fn invalidate_all(&mut self) {
        for way in self.ways.iter_mut() {
            *way = Way::default();
        }
        let assoc = self.ways.len();
        self.lru.clear();
        self.lru.extend(0..assoc);
    }

    pub fn resident_tags(&self) -> impl Iterator<Item = u64> + '_ {
        self.ways.iter().filter(|w| w.valid).map(|w| w.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn empty_set_finds_nothing() {
        let set = CacheSet::new(4);
        assert_eq!(set.find_way(0), None);
        assert_eq!(set.victim_way(), 3);
    }

    #[test]
    fn zero_tag_is_not_an_empty_slot() {
        let mut set = CacheSet::new(2);
        assert_eq!(set.find_way(0), None);
        let victim = set.victim_way();
        assert_eq!(set.install(victim, 0), None);
        assert_eq!(set.find_way(0), Some(victim));
    }

    #[test]
    fn touch_moves_way_to_front() {
        let mut set = CacheSet::new(4);
        set.touch(2);
        assert_eq!(set.lru_order(), &[2, 0, 1, 3]);
        set.touch(3);
        assert_eq!(set.lru_order(), &[3, 2, 0, 1]);
        set.touch(3);
        assert_eq!(set.lru_order(), &[3, 2, 0, 1]);
        assert!(is_permutation(set.lru_order(), 4));
    }

    #[test]
    fn install_fills_invalid_ways_before_evicting() {
        let mut set = CacheSet::new(2);
        for tag in [10, 11] {
            let victim = set.victim_way();
            assert_eq!(set.install(victim, tag), None);
        }
        let victim = set.victim_way();
        assert_eq!(set.install(victim, 12), Some(10));
        assert!(set.find_way(10).is_none());
        assert!(set.find_way(11).is_some());
        assert!(set.find_way(12).is_some());
    }

    #[test]
    fn victim_way_is_read_only() {
        let mut set = CacheSet::new(3);
        set.touch(1);
        let before = set.lru_order().to_vec();
        assert_eq!(set.victim_way(), set.victim_way());
        assert_eq!(set.lru_order(), before.as_slice());
    }

    #[test]
    fn invalidate_keeps_lru_order() {
        let mut set = CacheSet::new(2);
        let way = set.victim_way();
        set.install(way, 7);
        let before = set.lru_order().to_vec();
        assert_eq!(set.invalidate(way), Some(7));
        assert_eq!(set.invalidate(way), None);
        assert_eq!(set.lru_order(), before.as_slice());
        assert_eq!(set.find_way(7), None);
        assert_eq!(set.way(way).tag, 7);
    }

    #[test]
    fn invalidate_all_resets_order() {
        let mut set = CacheSet::new(4);
        for tag in 0..4 {
            let way = set.victim_way();
            set.install(way, tag);
        }
        set.invalidate_all();
        assert_eq!(set.resident_tags().count(), 0);
        assert_eq!(set.lru_order(), &[0, 1, 2, 3]);
    }
}
