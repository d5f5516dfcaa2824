//! Actions
//!
//! Operations that move identities through spectrum space.

pub mod movement;

pub use movement::{
    distance_between, move_by_delta, move_toward, move_toward_point, radius_query,
    reset_to_origin, set_absolute, MovementResult, Neighbor, TargetApproach,
};
