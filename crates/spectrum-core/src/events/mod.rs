//! Events
//!
//! Recording history events to durable sinks.

pub mod logger;

pub use logger::EventLogger;
