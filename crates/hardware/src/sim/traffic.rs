//! Random traffic generation.
//!
//! Produces a reproducible stream of byte reads and writes. A fraction of the accesses
//! targets a small set of hot blocks so that hits, conflict misses and dirty evictions
//! all occur; the rest are uniformly random addresses.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::loader::TraceEntry;

/// Shape of the generated traffic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrafficConfig {
    /// RNG seed; equal seeds give equal streams.
    pub seed: u64,
    /// Probability that an access is a write.
    pub write_ratio: f64,
    /// Probability that an access targets the hot working set.
    pub hot_ratio: f64,
    /// Number of distinct hot blocks.
    pub hot_blocks: usize,
    /// Block size in bytes, used to align the hot blocks.
    pub block_bytes: u32,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            write_ratio: 0.3,
            hot_ratio: 0.9,
            hot_blocks: 1024,
            block_bytes: 64,
        }
    }
}

/// Infinite iterator of random [`TraceEntry`] values.
#[derive(Debug)]
pub struct TrafficGenerator {
    rng: StdRng,
    hot: Vec<u32>,
    write_ratio: f64,
    hot_ratio: f64,
    block_bytes: u32,
}

impl TrafficGenerator {
    /// Creates a generator. Ratios outside `0.0..=1.0` are clamped.
    pub fn new(config: &TrafficConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let block_bytes = config.block_bytes.max(1);
        let block_mask = block_bytes
            .checked_next_power_of_two()
            .map_or(0, |size| !(size - 1));
        let hot = (0..config.hot_blocks)
            .map(|_| rng.random::<u32>() & block_mask)
            .collect();

        Self {
            rng,
            hot,
            write_ratio: clamp_ratio(config.write_ratio),
            hot_ratio: clamp_ratio(config.hot_ratio),
            block_bytes,
        }
    }

    fn next_address(&mut self) -> u32 {
        if !self.hot.is_empty() && self.rng.random_bool(self.hot_ratio) {
            let base = self.hot[self.rng.random_range(0..self.hot.len())];
            base.wrapping_add(self.rng.random_range(0..self.block_bytes))
        } else {
            self.rng.random()
        }
    }
}

impl Iterator for TrafficGenerator {
    type Item = TraceEntry;

    fn next(&mut self) -> Option<TraceEntry> {
        let address = self.next_address();
        if self.rng.random_bool(self.write_ratio) {
            Some(TraceEntry::write(address, self.rng.random()))
        } else {
            Some(TraceEntry::read(address))
        }
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) }
}
