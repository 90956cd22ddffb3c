//! # Set Tests
//!
//! Exercises a single 4-way set directly: hit detection, write-allocate, victim
//! selection (empty ways first, then greatest age, ties to the lowest way) and the
//! eviction record. Ages are driven explicitly through the replacement coordinator.

use cachesim_core::cache::{AgeUpdate, CacheSet, ReplacementCoordinator};
use cachesim_core::common::Operation;
use cachesim_core::common::addr::{AddressLayout, DecomposedAddr};
use cachesim_core::config::CacheConfig;
use cachesim_core::memory::{BackingStore, BlockMemory, ZeroFill};

use crate::common::builder::address::addr;

fn layout() -> AddressLayout {
    CacheConfig::default().geometry().unwrap().layout
}

fn at(tag: u32, word: u32, byte: u32) -> DecomposedAddr {
    layout().decompose(addr(tag, 0, word, byte))
}

fn set() -> CacheSet {
    CacheSet::new(4, 16, 4)
}

#[test]
fn cold_access_misses_into_way_zero() {
    let mut set = set();
    let result = set.access(&at(0x10, 0, 0), Operation::Read, &mut ZeroFill);

    assert!(!result.hit);
    assert_eq!(result.way, 0);
    assert!(result.filled_empty);
    assert_eq!(result.evicted, None);
    assert_eq!(result.data, 0);
    assert_eq!(set.lookup(0x10), Some(0));
}

#[test]
fn empty_ways_fill_in_index_order() {
    let mut set = set();
    for (expected_way, tag) in [0x10, 0x11, 0x12, 0x13].into_iter().enumerate() {
        let result = set.access(&at(tag, 0, 0), Operation::Read, &mut ZeroFill);
        assert_eq!(result.way, expected_way);
        assert!(result.filled_empty);
    }
    assert!(set.lines().iter().all(|line| line.is_valid()));
}

#[test]
fn read_hit_returns_the_stored_byte() {
    let mut set = set();
    let _ = set.access(&at(0x20, 3, 1), Operation::Write(0x5A), &mut ZeroFill);

    let result = set.access(&at(0x20, 3, 1), Operation::Read, &mut ZeroFill);
    assert!(result.hit);
    assert_eq!(result.way, 0);
    assert_eq!(result.data, 0x5A);
}

#[test]
fn write_miss_allocates_then_writes() {
    let mut set = set();
    let result = set.access(&at(0x30, 7, 2), Operation::Write(0xEE), &mut ZeroFill);

    assert!(!result.hit);
    assert_eq!(result.data, 0xEE);
    let line = set.line(result.way).unwrap();
    assert!(line.is_valid());
    assert!(line.is_dirty());
    assert_eq!(line.read_byte(7, 2), 0xEE);
}

#[test]
fn write_hit_marks_the_hit_way_dirty_only() {
    let mut set = set();
    let _ = set.access(&at(1, 0, 0), Operation::Read, &mut ZeroFill);
    let _ = set.access(&at(2, 0, 0), Operation::Read, &mut ZeroFill);

    let result = set.access(&at(2, 0, 0), Operation::Write(1), &mut ZeroFill);
    assert!(result.hit);
    assert_eq!(result.way, 1);
    assert!(!set.line(0).unwrap().is_dirty());
    assert!(set.line(1).unwrap().is_dirty());
}

#[test]
fn full_set_with_equal_ages_evicts_the_lowest_way() {
    let mut set = set();
    for tag in 0..4 {
        let _ = set.access(&at(tag, 0, 0), Operation::Read, &mut ZeroFill);
    }
    // No age updates were applied, so every way is at age 0.
    assert_eq!(set.select_victim(), 0);
}

#[test]
fn full_set_evicts_the_greatest_age() {
    let mut set = set();
    for tag in 0..4 {
        let _ = set.access(&at(tag, 0, 0), Operation::Read, &mut ZeroFill);
    }
    let coordinator = ReplacementCoordinator::new(3);
    coordinator.apply(
        &mut set,
        &AgeUpdate {
            reset_way: 0,
            increment_mask: 0b0100,
        },
    );
    assert_eq!(set.snapshot().ages(), vec![0, 0, 1, 0]);
    assert_eq!(set.select_victim(), 2);

    let result = set.access(&at(9, 0, 0), Operation::Read, &mut ZeroFill);
    assert_eq!(result.way, 2);
    let evicted = result.evicted.unwrap();
    assert_eq!(evicted.tag, 2);
    assert!(!evicted.dirty);
    assert_eq!(evicted.block_addr, addr(2, 0, 0, 0));
}

#[test]
fn empty_way_is_preferred_over_aged_ways() {
    let mut set = set();
    let _ = set.access(&at(0, 0, 0), Operation::Read, &mut ZeroFill);
    let _ = set.access(&at(1, 0, 0), Operation::Read, &mut ZeroFill);
    let coordinator = ReplacementCoordinator::new(3);
    let update = AgeUpdate {
        reset_way: 1,
        increment_mask: 0b0001,
    };
    for _ in 0..3 {
        coordinator.apply(&mut set, &update);
    }
    assert_eq!(set.select_victim(), 2);
}

#[test]
fn dirty_victim_is_reported_with_its_contents() {
    let mut set = set();
    let _ = set.access(&at(0xA, 4, 0), Operation::Write(0x77), &mut ZeroFill);
    for tag in [0xB, 0xC, 0xD] {
        let _ = set.access(&at(tag, 0, 0), Operation::Read, &mut ZeroFill);
    }

    let result = set.access(&at(0xE, 0, 0), Operation::Read, &mut ZeroFill);
    let evicted = result.evicted.unwrap();
    assert_eq!(evicted.tag, 0xA);
    assert!(evicted.dirty);
    assert_eq!(evicted.data[4 * 4], 0x77);
    assert_eq!(evicted.data.len(), 64);

    // The fresh line is clean and zeroed.
    let line = set.line(result.way).unwrap();
    assert!(line.probe(0xE));
    assert!(!line.is_dirty());
    assert_eq!(line.read_byte(4, 0), 0);
}

#[test]
fn reset_empties_every_way() {
    let mut set = set();
    let _ = set.access(&at(5, 0, 0), Operation::Write(1), &mut ZeroFill);
    set.reset();
    assert!(set.lines().iter().all(|line| !line.is_valid() && !line.is_dirty()));
    assert_eq!(set.lookup(5), None);
}

#[test]
fn fetched_block_is_installed_clean_before_a_write_miss_lands() {
    let mut memory = BlockMemory::new(64);
    let block: Vec<u8> = (100..164).collect();
    memory.write_back(at(0x21, 0, 0).block_address(), &block);

    let mut set = set();
    let result = set.access(&at(0x21, 2, 1), Operation::Write(0xEE), &mut memory);
    assert!(!result.hit);

    let line = set.line(result.way).unwrap();
    assert!(line.is_dirty());
    assert_eq!(line.read_byte(2, 1), 0xEE);
    assert_eq!(line.read_byte(0, 0), 100);
    assert_eq!(line.read_byte(15, 3), 163);
    assert_eq!(memory.fetches(), 1);
}

#[test]
fn partial_fetches_leave_the_rest_of_the_line_zeroed() {
    #[derive(Debug)]
    struct HeaderOnly;

    impl BackingStore for HeaderOnly {
        fn fetch_block(&mut self, block_addr: u32, buf: &mut [u8]) {
            if block_addr == at(1, 0, 0).block_address() {
                buf.fill(0xAA);
            } else {
                buf[0] = 0x5A;
            }
        }

        fn write_back(&mut self, _block_addr: u32, _data: &[u8]) {}
    }

    let mut set = set();
    let _ = set.access(&at(1, 0, 0), Operation::Read, &mut HeaderOnly);
    let result = set.access(&at(2, 0, 0), Operation::Read, &mut HeaderOnly);

    let line = set.line(result.way).unwrap();
    assert_eq!(result.data, 0x5A);
    assert!(line.data()[1..].iter().all(|&b| b == 0));
}
