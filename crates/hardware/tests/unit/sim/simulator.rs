//! # Simulator Tests
//!
//! Replays streams through a cache. With a functional backing memory reads always see
//! the last written value; without one, data in evicted dirty lines is lost.

use cachesim_core::cache::CacheStore;
use cachesim_core::config::CacheConfig;
use cachesim_core::memory::BlockMemory;
use cachesim_core::sim::{Simulator, TraceEntry, TrafficConfig, TrafficGenerator};

use crate::common::builder::address::small_addr;
use crate::common::harness::{init_tracing, small_config};

#[test]
fn random_traffic_with_memory_never_mismatches() {
    init_tracing();
    let cache = CacheStore::with_memory(&small_config(), BlockMemory::new(64)).unwrap();
    let mut simulator = Simulator::new(cache);
    let traffic = TrafficConfig {
        seed: 3,
        hot_blocks: 64,
        write_ratio: 0.5,
        ..TrafficConfig::default()
    };

    let summary = simulator.run(TrafficGenerator::new(&traffic).take(20_000));
    assert_eq!(summary.mismatches, 0);
    assert_eq!(summary.stats.accesses(), 20_000);
    assert!(summary.stats.hits > 0);
    assert!(summary.stats.evictions > 0);
    assert!(summary.stats.write_backs > 0);
}

#[test]
fn dirty_eviction_without_memory_loses_data() {
    init_tracing();
    let cache = CacheStore::new(&small_config()).unwrap();
    let mut simulator = Simulator::new(cache);

    let mut trace = vec![TraceEntry::write(small_addr(1, 0, 0), 0x42)];
    trace.extend((2..6).map(|tag| TraceEntry::read(small_addr(tag, 0, 0))));
    trace.push(TraceEntry::read(small_addr(1, 0, 0)));

    let summary = simulator.run(trace);
    assert_eq!(summary.mismatches, 1);
    assert_eq!(summary.stats.write_backs, 1);
}

#[test]
fn step_reports_each_outcome() {
    init_tracing();
    let mut simulator = Simulator::new(CacheStore::new(&CacheConfig::default()).unwrap());
    assert!(!simulator.step(TraceEntry::write(0x100, 5)).hit);

    let outcome = simulator.step(TraceEntry::read(0x100));
    assert!(outcome.hit);
    assert_eq!(outcome.data, 5);
    assert_eq!(simulator.summary().mismatches, 0);
}
