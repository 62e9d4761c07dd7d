use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn small_config(inclusive: bool) -> HierarchyConfig {
    HierarchyConfig {
        icache: LevelConfig::new(4, 1, 1),
        dcache: LevelConfig::new(4, 1, 1),
        l2cache: LevelConfig::new(4, 2, 10),
        inclusive,
        block_size: 16,
        mem_speed: 100,
    }
}

/// L2 with a single one-way set, so every L2 miss evicts whatever was there.
fn tiny_l2_config(inclusive: bool) -> HierarchyConfig {
    HierarchyConfig {
        icache: LevelConfig::new(4, 1, 1),
        dcache: LevelConfig::new(4, 2, 2),
        l2cache: LevelConfig::new(1, 1, 10),
        inclusive,
        block_size: 16,
        mem_speed: 100,
    }
}

fn single_set_level(assoc: u64) -> CacheLevel {
    CacheLevel::new(LevelId::DCache, &LevelConfig::new(1, assoc, 1), 16).unwrap()
}

fn assert_l1_subset_of_l2(h: &Hierarchy) {
    let l2 = h.level(LevelId::L2Cache);
    for id in [LevelId::ICache, LevelId::DCache] {
        for block in h.level(id).resident_blocks() {
            assert!(l2.probe(block), "{id} holds {block:#x} but L2 does not");
        }
    }
}

#[test]
fn end_to_end_scenario() {
    let mut h = Hierarchy::new(&small_config(true)).unwrap();
    assert_eq!(h.access(0, AccessKind::Instruction), 111);
    assert_eq!(h.access(0, AccessKind::Instruction), 1);
    assert_eq!(h.access(16, AccessKind::Instruction), 111);

    let stats = h.stats();
    assert_eq!(stats.icache.counters.references, 3);
    assert_eq!(stats.icache.counters.misses, 2);
    assert_eq!(stats.icache.counters.penalties, 220);
    assert_eq!(stats.l2cache.counters.references, 2);
    assert_eq!(stats.l2cache.counters.misses, 2);
    assert_eq!(stats.l2cache.counters.penalties, 200);
    assert_eq!(stats.dcache.counters.references, 0);
}

#[test]
fn l1_miss_l2_hit_costs_both_hit_times() {
    let mut h = Hierarchy::new(&small_config(true)).unwrap();
    h.access(0x40, AccessKind::DataLoad);
    // I$ misses on a block the D$ miss already brought into L2.
    assert_eq!(h.access(0x40, AccessKind::Instruction), 10 + 1);
    assert_eq!(h.stats().icache.counters.penalties, 10);
}

#[test]
fn loads_and_stores_share_the_dcache() {
    let mut h = Hierarchy::new(&small_config(true)).unwrap();
    h.access(0x80, AccessKind::DataStore);
    assert_eq!(h.access(0x84, AccessKind::DataLoad), 1);
    assert_eq!(h.stats().dcache.counters.references, 2);
    assert_eq!(h.stats().icache.counters.references, 0);
}

#[test]
fn lru_evicts_least_recent_tag() {
    let mut level = single_set_level(2);
    let (a, b, c) = (0x00, 0x10, 0x20);
    assert_eq!(level.access(a), AccessOutcome::Miss { set: 0, evicted: None });
    assert_eq!(level.access(b), AccessOutcome::Miss { set: 0, evicted: None });
    assert_eq!(level.access(c), AccessOutcome::Miss { set: 0, evicted: Some(0) });
    assert_eq!(level.access(a), AccessOutcome::Miss { set: 0, evicted: Some(1) });
}

#[test]
fn cyclic_pattern_one_larger_than_assoc_always_misses() {
    for k in 1..=4u64 {
        let mut level = single_set_level(k);
        let tags: Vec<u64> = (0..=k).map(|t| t * 16).collect();
        for round in 0..4 {
            for &addr in &tags {
                let outcome = level.access(addr);
                assert!(!outcome.is_hit(), "assoc {k} round {round} addr {addr:#x}");
            }
        }
    }
}

#[test]
fn hit_promotes_to_most_recently_used() {
    let k = 4u64;
    let mut level = single_set_level(k);
    for t in 0..k {
        level.access(t * 16);
    }
    // Tag 0 is LRU now; re-referencing it must hit and save it.
    assert!(level.access(0).is_hit());
    for t in k..(2 * k - 1) {
        level.access(t * 16);
    }
    assert!(level.probe(0));
    assert!(level.access(0).is_hit());
}

#[test]
fn inclusive_l2_eviction_invalidates_dcache_copy() {
    let mut h = Hierarchy::new(&tiny_l2_config(true)).unwrap();
    h.access(0x00, AccessKind::DataLoad);
    assert!(h.level(LevelId::DCache).probe(0x00));

    // Displaces block 0x00 from the single L2 way.
    h.access(0x100, AccessKind::Instruction);
    assert!(!h.level(LevelId::DCache).probe(0x00));
    assert_eq!(h.stats().dcache.counters.invalidations, 1);

    assert_eq!(h.access(0x00, AccessKind::DataLoad), 100 + 10 + 2);
    assert_eq!(h.stats().dcache.counters.misses, 2);
    assert_l1_subset_of_l2(&h);
}

#[test]
fn non_inclusive_l2_eviction_keeps_dcache_copy() {
    let mut h = Hierarchy::new(&tiny_l2_config(false)).unwrap();
    h.access(0x00, AccessKind::DataLoad);
    h.access(0x100, AccessKind::Instruction);
    assert!(!h.level(LevelId::L2Cache).probe(0x00));
    assert_eq!(h.access(0x00, AccessKind::DataLoad), 2);
    assert_eq!(h.stats().dcache.counters.invalidations, 0);
}

#[test]
fn inclusion_holds_across_mismatched_geometries() {
    let config = HierarchyConfig {
        icache: LevelConfig::new(8, 1, 1),
        dcache: LevelConfig::new(16, 2, 1),
        l2cache: LevelConfig::new(2, 3, 8),
        inclusive: true,
        block_size: 32,
        mem_speed: 50,
    };
    let mut h = Hierarchy::new(&config).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..2000 {
        let addr = rng.gen_range(0..0x2000u64);
        let kind = match rng.gen_range(0..3) {
            0 => AccessKind::Instruction,
            1 => AccessKind::DataLoad,
            _ => AccessKind::DataStore,
        };
        h.access(addr, kind);
        assert_l1_subset_of_l2(&h);
    }
    assert!(h.stats().icache.counters.invalidations + h.stats().dcache.counters.invalidations > 0);
}

#[test]
fn counters_are_conserved() {
    let mut h = Hierarchy::new(&small_config(true)).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut total_cycles = 0u64;
    let n = 500u64;
    for _ in 0..n {
        let addr = rng.gen_range(0..0x400u64);
        let kind = if rng.gen_bool(0.5) {
            AccessKind::Instruction
        } else {
            AccessKind::DataLoad
        };
        total_cycles += h.access(addr, kind);
    }
    let s = h.stats();
    assert_eq!(s.icache.counters.references + s.dcache.counters.references, n);
    for level in [&s.icache, &s.dcache, &s.l2cache] {
        assert_eq!(level.hits + level.counters.misses, level.counters.references);
    }
    assert_eq!(
        s.l2cache.counters.references,
        s.icache.counters.misses + s.dcache.counters.misses
    );
    // Both L1s have a one-cycle hit time.
    let expected = s.icache.counters.references
        + s.dcache.counters.references
        + s.icache.counters.penalties
        + s.dcache.counters.penalties;
    assert_eq!(total_cycles, expected);
}

#[test]
fn stat_queries_do_not_mutate() {
    let mut h = Hierarchy::new(&small_config(true)).unwrap();
    h.access(0x10, AccessKind::DataLoad);
    h.access(0x10, AccessKind::DataLoad);
    let first = h.stats();
    let rate = h.collector().miss_rate(LevelId::DCache);
    let amat = h.collector().average_access_time(LevelId::DCache);
    for _ in 0..3 {
        assert_eq!(h.stats(), first);
        assert_eq!(h.collector().miss_rate(LevelId::DCache), rate);
        assert_eq!(h.collector().average_access_time(LevelId::DCache), amat);
    }
    assert_eq!(rate, 0.5);
    assert_eq!(amat, 1.0 + 0.5 * 110.0);
}

#[test]
fn reset_empties_caches_and_counters() {
    let mut h = Hierarchy::new(&small_config(true)).unwrap();
    h.access(0, AccessKind::Instruction);
    h.reset();
    assert_eq!(h.stats().icache.counters, StatCounters::default());
    assert_eq!(h.access(0, AccessKind::Instruction), 111);
}

#[test]
fn rejects_invalid_configuration() {
    let config = HierarchyConfig {
        block_size: 12,
        ..small_config(true)
    };
    assert!(matches!(
        Hierarchy::new(&config),
        Err(crate::error::CacheError::InvalidConfiguration(_))
    ));
}

#[test]
fn oversized_l2_is_a_configuration_error() {
    let config = HierarchyConfig {
        l2cache: LevelConfig::new(4, u64::MAX, 10),
        ..small_config(true)
    };
    assert!(matches!(
        Hierarchy::new(&config),
        Err(crate::error::CacheError::InvalidConfiguration(_))
    ));
}
