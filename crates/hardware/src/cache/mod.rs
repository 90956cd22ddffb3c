//! Set-Associative Write-Back Cache.
//!
//! This module implements a byte-addressable, set-associative cache with a write-back,
//! write-allocate policy and age-based LRU replacement. It is organised leaves first:
//! 1. **Line:** Tag, validity, dirty flag, data block and age of one way.
//! 2. **Set:** Tag comparison across the ways, victim selection and allocation.
//! 3. **Replacement:** The LRU age update applied after every access.
//! 4. **Store:** Routing of each access to the set selected by its address.
//!
//! Accesses are processed one at a time; each completes its lookup, allocation and age
//! update before the next one starts. Only the addressed set changes.

/// A single cache line.
pub mod line;

/// Age-based LRU replacement.
pub mod replacement;

/// One set of ways.
pub mod set;

use tracing::{debug, info, trace};

pub use self::line::CacheLine;
pub use self::replacement::{AgeUpdate, ReplacementCoordinator};
pub use self::set::{CacheSet, EvictedLine, SetAccess, SetSnapshot, WaySnapshot};
use crate::common::addr::ADDRESS_BITS;
use crate::common::data::Operation;
use crate::common::error::ConfigError;
use crate::config::{CacheConfig, CacheGeometry};
use crate::memory::{BackingStore, ZeroFill};
use crate::stats::CacheStats;

/// Everything observable about one access.
///
/// Per-way state of the touched set is available afterwards through
/// [`CacheStore::snapshot`] with `set_index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Whether the block was already cached.
    pub hit: bool,
    /// Set consulted.
    pub set_index: usize,
    /// Hit way, or the way allocated on a miss.
    pub way: usize,
    /// Byte read, or byte written.
    pub data: u8,
    /// The valid line replaced by a miss, with the contents it held.
    pub evicted: Option<EvictedLine>,
}

impl AccessOutcome {
    /// One-hot identity of the way involved (bit `way` set).
    pub fn way_mask(&self) -> u64 {
        1u64.checked_shl(self.way as u32).unwrap_or(0)
    }
}

/// A set-associative cache: the sole entry point for accesses.
///
/// `M` is the next memory level. The default [`ZeroFill`] performs no transfers, so missed
/// blocks arrive zero-filled and dirty victims are only reported, not stored.
///
/// # Examples
///
/// ```
/// use cachesim_core::cache::CacheStore;
/// use cachesim_core::config::CacheConfig;
///
/// let mut cache = CacheStore::new(&CacheConfig::default()).unwrap();
/// assert!(!cache.write(0x1234, 0xAB).hit);
/// let again = cache.read(0x1234);
/// assert!(again.hit);
/// assert_eq!(again.data, 0xAB);
/// ```
#[derive(Debug)]
pub struct CacheStore<M = ZeroFill> {
    sets: Vec<CacheSet>,
    geometry: CacheGeometry,
    coordinator: ReplacementCoordinator,
    memory: M,
    stats: CacheStats,
}

impl CacheStore<ZeroFill> {
    /// Creates an empty cache with no backing memory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is not a valid geometry.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        Self::with_memory(config, ZeroFill)
    }
}

impl CacheStore<Box<dyn BackingStore>> {
    /// Creates an empty cache in front of a next level chosen at runtime.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is not a valid geometry.
    pub fn with_backing_store(
        config: &CacheConfig,
        memory: Box<dyn BackingStore>,
    ) -> Result<Self, ConfigError> {
        Self::with_memory(config, memory)
    }
}

impl<M: BackingStore> CacheStore<M> {
    /// Creates an empty cache in front of `memory`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is not a valid geometry.
    pub fn with_memory(config: &CacheConfig, memory: M) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;

        info!(
            sets = geometry.sets,
            ways = geometry.ways,
            block_bytes = geometry.block_bytes,
            tag_bits = geometry.layout.tag_bits,
            address_bits = ADDRESS_BITS,
            "cache constructed"
        );

        Ok(Self {
            sets: (0..geometry.sets)
                .map(|_| {
                    CacheSet::new(
                        geometry.ways,
                        geometry.words_per_block,
                        geometry.bytes_per_word,
                    )
                })
                .collect(),
            coordinator: ReplacementCoordinator::new(geometry.max_age),
            geometry,
            memory,
            stats: CacheStats::default(),
        })
    }

    /// Performs one access.
    ///
    /// Decomposes `address`, routes it to its set, applies the LRU age update to that set and
    /// returns the set's result. Total: every address and operation yields an outcome.
    pub fn access(&mut self, address: u32, op: Operation) -> AccessOutcome {
        let addr = self.geometry.layout.decompose(address);
        let set = &mut self.sets[addr.set_index];

        let result = set.access(&addr, op, &mut self.memory);
        let _ = self.coordinator.update(set, &result);

        self.stats.record(op, &result);
        trace!(
            address,
            set = addr.set_index,
            way = result.way,
            hit = result.hit,
            %op,
            "access"
        );

        AccessOutcome {
            hit: result.hit,
            set_index: addr.set_index,
            way: result.way,
            data: result.data,
            evicted: result.evicted,
        }
    }

    /// Reads one byte.
    pub fn read(&mut self, address: u32) -> AccessOutcome {
        self.access(address, Operation::Read)
    }

    /// Writes one byte.
    pub fn write(&mut self, address: u32, value: u8) -> AccessOutcome {
        self.access(address, Operation::Write(value))
    }

    /// Returns `true` if the block holding `address` is cached. No state changes.
    pub fn contains(&self, address: u32) -> bool {
        let addr = self.geometry.layout.decompose(address);
        self.sets[addr.set_index].lookup(addr.tag).is_some()
    }

    /// Writes every dirty line back to memory and marks it clean.
    ///
    /// Lines stay valid and keep their ages. Returns the number of blocks written back.
    pub fn flush(&mut self) -> usize {
        let layout = self.geometry.layout;
        let written: usize = self
            .sets
            .iter_mut()
            .enumerate()
            .map(|(index, set)| set.flush(index, &layout, &mut self.memory))
            .sum();
        self.stats.write_backs += written as u64;
        debug!(written, "cache flushed");
        written
    }

    /// Returns every line to the empty power-on state. Dirty data is discarded.
    pub fn reset(&mut self) {
        self.sets.iter_mut().for_each(CacheSet::reset);
        debug!("cache reset");
    }

    /// State of one set, or `None` if `set_index` is out of range.
    pub fn snapshot(&self, set_index: usize) -> Option<SetSnapshot> {
        self.sets.get(set_index).map(CacheSet::snapshot)
    }

    /// Read access to one set.
    pub fn set(&self, set_index: usize) -> Option<&CacheSet> {
        self.sets.get(set_index)
    }

    /// Validated geometry.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Accumulated access statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Clears the access statistics; cache contents are unaffected.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// The next memory level.
    pub const fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutable access to the next memory level.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Consumes the cache, returning the next memory level. Dirty lines are not flushed.
    pub fn into_memory(self) -> M {
        self.memory
    }
}
