//! Set-associative write-back cache model.
//!
//! This crate models a byte-addressable cache between a processor and main memory:
//! 1. **Common:** Address decomposition, access operations and error types.
//! 2. **Cache:** Lines, 4-way sets, age-based LRU replacement and the set-routing store.
//! 3. **Memory:** The block-transfer interface to the next level and its implementations.
//! 4. **Simulation:** Configuration, trace loading, random traffic and statistics.

/// Common types (addresses, operations, errors).
pub mod common;
/// Cache configuration (defaults, validation, derived geometry).
pub mod config;
/// The cache itself (line, set, replacement, store).
pub mod cache;
/// Next memory level (backing store trait and implementations).
pub mod memory;
/// Trace replay and random traffic.
pub mod sim;
/// Access statistics.
pub mod stats;

/// Main cache type; construct with `CacheStore::new` or `CacheStore::with_memory`.
pub use crate::cache::CacheStore;
/// Cache configuration; use `CacheConfig::default()` or deserialize from JSON.
pub use crate::config::CacheConfig;
/// Read or write request.
pub use crate::common::Operation;
