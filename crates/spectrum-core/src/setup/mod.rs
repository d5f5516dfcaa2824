//! World Setup
//!
//! World file loading and installation.

pub mod world;

pub use world::{ItemDef, SetupError, WorldFile, WorldSummary};
