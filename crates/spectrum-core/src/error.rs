//! Error Types
//!
//! Typed failures surfaced by the core. `NotFound` and `KeeperImmutable` are
//! returned to callers; `InvalidHeading` and `InsufficientHullPoints` are
//! recovered locally by the tick; `Persistence` is counted per identity/zone.

use thiserror::Error;

/// Failure reported by a persistence or history collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Backend could not be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Backend refused a write
    #[error("write rejected for {key}: {reason}")]
    WriteRejected { key: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors produced by spectrum operations.
#[derive(Debug, Error)]
pub enum SpectrumError {
    /// Identity, point, heading or zone does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// Any attempt to move or reset the Keeper
    #[error("keeper {0} is pinned at the origin and cannot be moved")]
    KeeperImmutable(String),
    /// Heading string that matches no known shape
    #[error("invalid heading '{0}'")]
    InvalidHeading(String),
    /// Hull zone with fewer than four resolvable points
    #[error("hull zone {zone_id} resolved {found} points, at least 4 are required")]
    InsufficientHullPoints { zone_id: String, found: usize },
    /// Hull zone whose convex hull has more corners than allowed
    #[error("hull zone {zone_id} needs {vertices} vertices, at most {max_points} are allowed")]
    HullTooComplex {
        zone_id: String,
        vertices: usize,
        max_points: usize,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

impl SpectrumError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        SpectrumError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for errors the tick degrades to a no-op instead of counting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SpectrumError::InvalidHeading(_) | SpectrumError::InsufficientHullPoints { .. }
        )
    }
}

/// Error parsing an axis name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown axis '{0}'")]
pub struct ParseAxisError(pub String);

/// Hull whose corner count exceeds the configured maximum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hull needs {vertices} vertices, at most {max_points} are allowed")]
pub struct TooManyVertices {
    pub vertices: usize,
    pub max_points: usize,
}

pub type Result<T, E = SpectrumError> = std::result::Result<T, E>;
