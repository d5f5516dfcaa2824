//! Output
//!
//! Run statistics and snapshots.

pub mod snapshot;
pub mod stats;

pub use snapshot::{build_snapshot, write_snapshot};
pub use stats::{write_stats, SimulationStats, StatsCollector, TickSummary};
