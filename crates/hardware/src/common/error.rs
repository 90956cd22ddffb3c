//! Error definitions.
//!
//! Access-time operations on the cache are total, so every error here is raised either
//! while building a cache from its configuration or while loading input traces.

use thiserror::Error;

/// Configuration-time invariant violations.
///
/// Returned by [`CacheConfig::geometry`](crate::config::CacheConfig::geometry) and
/// [`CacheStore::new`](crate::cache::CacheStore::new); never produced during an access.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A count that indexes address bits is zero or not a power of two.
    #[error("{field} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// Way masks are 64-bit, so a set holds at most 64 ways.
    #[error("at most 64 ways per set are supported, got {0}")]
    TooManyWays(usize),

    /// The field widths do not cover the address exactly.
    #[error(
        "address fields must sum to {expected} bits: tag {tag} + index {index} + block {block} + byte {byte}"
    )]
    WidthMismatch {
        /// Tag width in bits.
        tag: u32,
        /// Set-index width in bits.
        index: u32,
        /// Block-offset width in bits.
        block: u32,
        /// Byte-offset width in bits.
        byte: u32,
        /// Required total (the address width).
        expected: u32,
    },

    /// The configuration document could not be parsed.
    #[error("invalid cache configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures while loading an access trace from disk.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be read.
    #[error("could not read trace: {0}")]
    Io(#[from] std::io::Error),

    /// The trace file is not a JSON array of trace entries.
    #[error("malformed trace: {0}")]
    Parse(#[from] serde_json::Error),
}
