//! Simulation drivers.
//!
//! Supplies access streams to a cache and collects the results. It provides:
//! 1. **Loader:** Reading recorded access traces from JSON files.
//! 2. **Traffic:** Seeded random read/write traffic with a hot working set.
//! 3. **Simulator:** Replay of a stream through a cache with a shadow copy of written data.

/// JSON trace loading.
pub mod loader;
/// Stream replay with shadow checking.
pub mod simulator;
/// Seeded random traffic.
pub mod traffic;

pub use loader::{TraceEntry, TraceOp, load_trace, parse_trace};
pub use simulator::{RunSummary, Simulator};
pub use traffic::{TrafficConfig, TrafficGenerator};
