//! Age-based Least Recently Used (LRU) replacement.
//!
//! Every way carries a small age counter; 0 marks the most recently used way and the
//! least recently used way holds the greatest age. After each access the way that took
//! part (hit way or allocated victim) is reset to 0 and every way that was younger than
//! it ages by one step. Ways already older keep their age.
//!
//! An empty way that receives an allocation is treated as if it held the maximum age,
//! so the valid ways of a set always carry distinct ages `0..valid_count`, and a full set
//! carries exactly the ages `0..ways`.
//!
//! # Performance
//!
//! - **Time Complexity:** O(W) per access, where W is the associativity
//! - **Space Complexity:** `log2(W)` bits per line (2 bits for 4 ways)

use super::set::{CacheSet, SetAccess};
use crate::config::MAX_WAYS;

/// Age changes derived from one access: the reset way and the one-hot increment mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgeUpdate {
    /// Way that becomes most recently used.
    pub reset_way: usize,
    /// Bit `w` set means way `w` ages by one step.
    pub increment_mask: u64,
}

impl AgeUpdate {
    /// Returns `true` if `way` ages under this update.
    #[inline(always)]
    pub const fn increments(&self, way: usize) -> bool {
        way < MAX_WAYS && (self.increment_mask >> way) & 1 == 1
    }

    /// Ways that age, in ascending order.
    pub fn incremented_ways(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_WAYS).filter(move |&way| self.increments(way))
    }
}

/// Computes and applies the LRU age update for the set touched by an access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplacementCoordinator {
    max_age: u8,
}

impl ReplacementCoordinator {
    /// Creates a coordinator whose counters saturate at `max_age` (`ways - 1`).
    pub const fn new(max_age: u8) -> Self {
        Self { max_age }
    }

    /// Largest age a way can reach.
    pub const fn max_age(&self) -> u8 {
        self.max_age
    }

    /// Derives the age update for an access that touched `way`.
    ///
    /// `ages` are the per-way ages before the access. `filled_empty` marks a miss served by
    /// an empty way, whose previous age is taken to be the maximum. Ways beyond
    /// [`MAX_WAYS`] are ignored.
    pub fn plan(&self, ages: &[u8], way: usize, filled_empty: bool) -> AgeUpdate {
        let prior = if filled_empty {
            self.max_age
        } else {
            ages.get(way).copied().unwrap_or(self.max_age)
        };

        let increment_mask = ages
            .iter()
            .take(MAX_WAYS)
            .enumerate()
            .filter(|&(other, &age)| other != way && age < prior)
            .fold(0u64, |mask, (other, _)| mask | (1 << other));

        AgeUpdate {
            reset_way: way,
            increment_mask,
        }
    }

    /// Applies a planned update to `set`. Increments saturate at the maximum age.
    pub fn apply(&self, set: &mut CacheSet, update: &AgeUpdate) {
        for (way, line) in set.lines_mut().iter_mut().enumerate() {
            if way == update.reset_way {
                line.reset_age();
            } else if update.increments(way) {
                line.increment_age(self.max_age);
            }
        }
    }

    /// Plans and applies the update for `access`, which was just performed on `set`.
    pub fn update(&self, set: &mut CacheSet, access: &SetAccess) -> AgeUpdate {
        let mut ages = [0u8; MAX_WAYS];
        let lines = set.lines();
        for (slot, line) in ages.iter_mut().zip(lines) {
            *slot = line.age();
        }
        let ways = lines.len().min(MAX_WAYS);

        let update = self.plan(&ages[..ways], access.way, access.filled_empty);
        self.apply(set, &update);
        update
    }
}
