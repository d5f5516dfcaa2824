//! Shared history and snapshot types for the spectrum simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod snapshot;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export event types
pub use event::{generate_event_id, HistoryEvent, HistoryEventBuilder, HistoryKind};

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, IdentitySnapshot, ItemSnapshot, SpectrumSnapshot, TickStats,
    ZoneSnapshot,
};
