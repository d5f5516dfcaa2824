//! Position Generator
//!
//! Deterministic initial positions derived from an identity string.
//!
//! The identity and the Keeper are both hashed with SHA-256; the absolute
//! difference of their leading 128 bits seeds six per-axis draws, which the
//! identity's weight category then pulls toward or pushes away from 50.

use sha2::{Digest, Sha256};

use crate::components::identity::WeightCategory;
use crate::components::point::{Point, AXIS_COUNT};
use crate::geometry::clamp;

/// Per-axis primes, canonical axis order
pub const AXIS_PRIMES: [u128; AXIS_COUNT] = [31, 37, 41, 43, 47, 53];
/// Per-axis offsets, canonical axis order
pub const AXIS_OFFSETS: [u128; AXIS_COUNT] = [11, 23, 47, 59, 83, 107];

const BASE_MODULUS: u128 = 10007;
const VARIANCE_MODULUS: u128 = 997;
const VARIANCE_SCALE: f64 = 0.12;
const BASE_CEILING: f64 = 0.9999;

/// Leading 16 bytes of SHA-256(identity), big-endian.
pub fn hash_identity(identity: &str) -> u128 {
    let digest = Sha256::digest(identity.as_bytes());
    let mut head = [0u8; 16];
    head.copy_from_slice(&digest[..16]);
    u128::from_be_bytes(head)
}

/// Generates initial points relative to a fixed Keeper.
#[derive(Debug, Clone)]
pub struct PositionGenerator {
    keeper_hash: u128,
}

impl PositionGenerator {
    pub fn new(keeper: &str) -> Self {
        Self {
            keeper_hash: hash_identity(keeper),
        }
    }

    /// Initial point for an identity. Pure: same inputs, same point.
    ///
    /// The Keeper (seed 0) always maps to the origin.
    pub fn generate(&self, identity: &str, category: Option<WeightCategory>) -> Point {
        let seed = hash_identity(identity).abs_diff(self.keeper_hash);
        if seed == 0 {
            return Point::ORIGIN;
        }

        let folded = u128::from(((seed >> 64) as u64) ^ (seed as u64));
        let multiplier = category.map_or(1.0, WeightCategory::multiplier);

        let mut values = [0i32; AXIS_COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            let prime = AXIS_PRIMES[i];
            let offset = AXIS_OFFSETS[i];

            let mut base = ((folded * prime + offset) % BASE_MODULUS) as f64 / BASE_MODULUS as f64;
            let variance =
                ((folded / prime + offset * 31) % VARIANCE_MODULUS) as f64 / VARIANCE_MODULUS as f64;
            let nudge = variance * VARIANCE_SCALE;
            if base < 0.5 {
                base += nudge;
            } else {
                base -= nudge;
            }
            let base = base.clamp(0.0, BASE_CEILING);

            let raw = (base * 101.0) as i32;
            *value = clamp((50.0 + f64::from(raw - 50) * multiplier) as i32);
        }
        Point::new(values)
    }
}
