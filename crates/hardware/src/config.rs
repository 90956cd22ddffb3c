//! Configuration for the cache model.
//!
//! This module defines the construction-time parameters of a cache. It provides:
//! 1. **Defaults:** The reference geometry (19-bit tag, 128 sets, 4 ways, 16 words of 4 bytes).
//! 2. **Structures:** A serde-deserializable [`CacheConfig`] and the derived [`CacheGeometry`].
//! 3. **Validation:** Fail-fast checks that the geometry covers a 32-bit address exactly.
//!
//! Configuration is supplied as JSON (`CacheConfig::from_json`) or use `CacheConfig::default()`.

use serde::Deserialize;

use crate::common::addr::{ADDRESS_BITS, AddressLayout};
use crate::common::error::ConfigError;

/// Default configuration constants for the cache.
mod defaults {
    /// Width of the stored tag in bits.
    pub const TAG_BITS: u32 = 19;

    /// Number of sets (7 index bits).
    pub const SETS: usize = 128;

    /// Associativity (4 ways, 2-bit ages).
    pub const WAYS: usize = 4;

    /// Words per block (4 block-offset bits).
    pub const WORDS_PER_BLOCK: usize = 16;

    /// Bytes per word (2 byte-offset bits).
    pub const BYTES_PER_WORD: usize = 4;
}

/// Largest supported associativity; way masks are 64-bit.
pub const MAX_WAYS: usize = 64;

/// Cache geometry as supplied by the user.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::CacheConfig;
///
/// let json = r#"{ "tag_bits": 20, "sets": 64 }"#;
/// let config = CacheConfig::from_json(json).unwrap();
/// assert_eq!(config.ways, 4);
/// assert_eq!(config.geometry().unwrap().block_bytes, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Width of the tag field in bits
    #[serde(default = "CacheConfig::default_tag_bits")]
    pub tag_bits: u32,

    /// Number of sets (power of two)
    #[serde(default = "CacheConfig::default_sets")]
    pub sets: usize,

    /// Associativity (number of ways per set)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Words per cache block
    #[serde(default = "CacheConfig::default_words_per_block")]
    pub words_per_block: usize,

    /// Bytes per word
    #[serde(default = "CacheConfig::default_bytes_per_word")]
    pub bytes_per_word: usize,
}

impl CacheConfig {
    fn default_tag_bits() -> u32 {
        defaults::TAG_BITS
    }

    fn default_sets() -> usize {
        defaults::SETS
    }

    fn default_ways() -> usize {
        defaults::WAYS
    }

    fn default_words_per_block() -> usize {
        defaults::WORDS_PER_BLOCK
    }

    fn default_bytes_per_word() -> usize {
        defaults::BYTES_PER_WORD
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `json` is not a valid configuration object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the configuration and derives the cache geometry.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::NotPowerOfTwo`] if a set, way, word or byte count is zero or not a power of two.
    /// * [`ConfigError::TooManyWays`] if the associativity exceeds [`MAX_WAYS`].
    /// * [`ConfigError::WidthMismatch`] if the field widths do not sum to the address width.
    pub fn geometry(&self) -> Result<CacheGeometry, ConfigError> {
        let index_bits = log2_exact("sets", self.sets)?;
        let _ = log2_exact("ways", self.ways)?;
        let block_bits = log2_exact("words_per_block", self.words_per_block)?;
        let byte_bits = log2_exact("bytes_per_word", self.bytes_per_word)?;

        if self.ways > MAX_WAYS {
            return Err(ConfigError::TooManyWays(self.ways));
        }

        let total = u64::from(self.tag_bits)
            + u64::from(index_bits)
            + u64::from(block_bits)
            + u64::from(byte_bits);
        if total != u64::from(ADDRESS_BITS) {
            return Err(ConfigError::WidthMismatch {
                tag: self.tag_bits,
                index: index_bits,
                block: block_bits,
                byte: byte_bits,
                expected: ADDRESS_BITS,
            });
        }

        Ok(CacheGeometry {
            sets: self.sets,
            ways: self.ways,
            words_per_block: self.words_per_block,
            bytes_per_word: self.bytes_per_word,
            block_bytes: self.words_per_block * self.bytes_per_word,
            max_age: (self.ways - 1) as u8,
            layout: AddressLayout {
                tag_bits: self.tag_bits,
                index_bits,
                block_bits,
                byte_bits,
            },
        })
    }
}

impl Default for CacheConfig {
    /// Creates the reference configuration: 128 sets of 4 ways, 64-byte blocks.
    fn default() -> Self {
        Self {
            tag_bits: defaults::TAG_BITS,
            sets: defaults::SETS,
            ways: defaults::WAYS,
            words_per_block: defaults::WORDS_PER_BLOCK,
            bytes_per_word: defaults::BYTES_PER_WORD,
        }
    }
}

/// Returns `log2(value)` if `value` is a non-zero power of two.
fn log2_exact(field: &'static str, value: usize) -> Result<u32, ConfigError> {
    if value.is_power_of_two() {
        Ok(value.trailing_zeros())
    } else {
        Err(ConfigError::NotPowerOfTwo { field, value })
    }
}

/// Validated, fixed-for-life cache geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Number of sets.
    pub sets: usize,
    /// Ways per set.
    pub ways: usize,
    /// Words per block.
    pub words_per_block: usize,
    /// Bytes per word.
    pub bytes_per_word: usize,
    /// Bytes per block (`words_per_block * bytes_per_word`).
    pub block_bytes: usize,
    /// Largest age a way can hold (`ways - 1`); the least recently used way holds it.
    pub max_age: u8,
    /// Address field widths.
    pub layout: AddressLayout,
}

impl CacheGeometry {
    /// Total data capacity in bytes.
    pub const fn capacity_bytes(&self) -> usize {
        self.sets * self.ways * self.block_bytes
    }
}
