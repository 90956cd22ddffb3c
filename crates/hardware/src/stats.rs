//! Cache statistics collection and reporting.
//!
//! This module tracks per-cache access metrics. It provides:
//! 1. **Traffic:** Read and write counts.
//! 2. **Outcomes:** Hits, misses and the derived hit rate.
//! 3. **Replacement:** Evictions of valid lines and write-backs of dirty data.

use std::fmt;

use crate::cache::SetAccess;
use crate::common::data::Operation;

/// Access statistics for one cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Read accesses.
    pub reads: u64,
    /// Write accesses.
    pub writes: u64,
    /// Accesses that found their block cached.
    pub hits: u64,
    /// Accesses that allocated a line.
    pub misses: u64,
    /// Misses that displaced a valid line.
    pub evictions: u64,
    /// Dirty blocks handed to the next level (evictions and flushes).
    pub write_backs: u64,
}

impl CacheStats {
    /// Folds one access into the counters.
    pub fn record(&mut self, op: Operation, access: &SetAccess) {
        match op {
            Operation::Read => self.reads += 1,
            Operation::Write(_) => self.writes += 1,
        }
        if access.hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        if let Some(evicted) = &access.evicted {
            self.evictions += 1;
            if evicted.dirty {
                self.write_backs += 1;
            }
        }
    }

    /// Total accesses.
    pub const fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Fraction of accesses that hit, or 0.0 before the first access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "CACHE STATISTICS")?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "  accesses      {:>12}", self.accesses())?;
        writeln!(f, "    reads       {:>12}", self.reads)?;
        writeln!(f, "    writes      {:>12}", self.writes)?;
        writeln!(f, "  hits          {:>12}", self.hits)?;
        writeln!(f, "  misses        {:>12}", self.misses)?;
        writeln!(f, "  hit rate      {:>11.2}%", self.hit_rate() * 100.0)?;
        writeln!(f, "  evictions     {:>12}", self.evictions)?;
        writeln!(f, "  write-backs   {:>12}", self.write_backs)?;
        write!(f, "==========================================================")
    }
}
