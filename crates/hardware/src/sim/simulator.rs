//! Simulator: drives a cache with an access stream and checks what it reads back.
//!
//! Alongside the cache the simulator keeps a shadow map of every byte written. A read whose
//! result differs from the shadow value is counted as a mismatch. With a functional backing
//! memory there are none; with [`ZeroFill`](crate::memory::ZeroFill) every dirty eviction
//! loses data and later reads of it mismatch.

use std::collections::HashMap;

use tracing::{debug, info};

use super::loader::TraceEntry;
use crate::cache::{AccessOutcome, CacheStore};
use crate::common::data::Operation;
use crate::memory::BackingStore;
use crate::stats::CacheStats;

/// Result of replaying a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Cache statistics at the end of the run.
    pub stats: CacheStats,
    /// Reads that returned something other than the last value written.
    pub mismatches: u64,
}

/// Owns a cache and the shadow copy of data written through it.
#[derive(Debug)]
pub struct Simulator<M> {
    /// The cache under test.
    pub cache: CacheStore<M>,
    shadow: HashMap<u32, u8>,
    mismatches: u64,
}

impl<M: BackingStore> Simulator<M> {
    /// Wraps `cache`.
    pub fn new(cache: CacheStore<M>) -> Self {
        Self {
            cache,
            shadow: HashMap::new(),
            mismatches: 0,
        }
    }

    /// Performs one access and checks reads against the shadow copy.
    pub fn step(&mut self, entry: TraceEntry) -> AccessOutcome {
        let op = entry.operation();
        let outcome = self.cache.access(entry.address, op);

        match op {
            Operation::Write(value) => {
                let _ = self.shadow.insert(entry.address, value);
            }
            Operation::Read => {
                let expected = self.shadow.get(&entry.address).copied().unwrap_or(0);
                if outcome.data != expected {
                    self.mismatches += 1;
                    debug!(
                        address = entry.address,
                        expected,
                        actual = outcome.data,
                        "read returned stale data"
                    );
                }
            }
        }

        outcome
    }

    /// Replays every entry of `entries` in order.
    pub fn run<I>(&mut self, entries: I) -> RunSummary
    where
        I: IntoIterator<Item = TraceEntry>,
    {
        let mut count = 0u64;
        for entry in entries {
            let _ = self.step(entry);
            count += 1;
        }
        info!(accesses = count, mismatches = self.mismatches, "run finished");
        self.summary()
    }

    /// Statistics and mismatch count so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            stats: *self.cache.stats(),
            mismatches: self.mismatches,
        }
    }
}
