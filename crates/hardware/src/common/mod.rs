//! Common types shared across the cache model.
//!
//! This module provides the building blocks used by every other component:
//! 1. **Addresses:** Decomposition of 32-bit addresses into tag, set index and offsets.
//! 2. **Access Requests:** The read/write operation handed to the cache.
//! 3. **Error Handling:** Configuration and trace-loading error types.

/// Address layout and decomposition.
pub mod addr;

/// Access operation definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{ADDRESS_BITS, AddressLayout, DecomposedAddr};
pub use data::Operation;
pub use error::{ConfigError, TraceError};
