//! Spectrum simulation core.
//!
//! Identities occupy points in a six-axis spectrum space, generated
//! deterministically from their identifiers and moved each tick by their
//! headings and by the zones they stand in.

pub mod actions;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod generator;
pub mod geometry;
pub mod hull;
pub mod octant;
pub mod output;
pub mod persistence;
pub mod setup;
pub mod store;
pub mod systems;

pub use components::{
    Anchor, Axis, AxisSet, Heading, IdentityRecord, Point, Sign, WeightCategory, WorldItem, Zone,
    ZoneEffect, ZoneShape,
};
pub use config::{ConfigError, SpectrumConfig};
pub use context::Spectrum;
pub use error::{PersistenceError, Result, SpectrumError};
pub use generator::PositionGenerator;
pub use octant::{classify, Octant};
pub use persistence::{
    HistoryRecorder, IdentityDirectory, MemoryDirectory, MemoryHistory, MemoryPersistence,
    Persistence,
};
