//! # Cache Tests
//!
//! Tests the cache leaves first: single lines, sets of ways, the LRU age update, the
//! routing store, the write-back contract with the next level, and randomized invariants.


/// Hit detection, victim selection and write-allocate within one set.
pub mod set;
