//! Octant Classifier
//!
//! Labels a point by the signs of its three axis-pair differences.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::point::{Axis, Point};

/// Coarse region of spectrum space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Octant {
    /// All three pairs balanced
    Equilibrium,
    /// Two pairs balanced
    Singling,
    /// One pair balanced
    Confused,
    Drifter,
    Iconoclast,
    Mystic,
    Zealot,
    Seeker,
    Cynic,
    Devotee,
    Warden,
}

impl Octant {
    pub fn name(self) -> &'static str {
        match self {
            Octant::Equilibrium => "equilibrium",
            Octant::Singling => "singling",
            Octant::Confused => "confused",
            Octant::Drifter => "drifter",
            Octant::Iconoclast => "iconoclast",
            Octant::Mystic => "mystic",
            Octant::Zealot => "zealot",
            Octant::Seeker => "seeker",
            Octant::Cynic => "cynic",
            Octant::Devotee => "devotee",
            Octant::Warden => "warden",
        }
    }
}

impl fmt::Display for Octant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a point.
pub fn classify(point: &Point) -> Octant {
    let d1 = point.get(Axis::Entropy) - point.get(Axis::Oblivion);
    let d2 = point.get(Axis::Liberty) - point.get(Axis::Authority);
    let d3 = point.get(Axis::Receptive) - point.get(Axis::Skeptic);

    match [d1, d2, d3].iter().filter(|d| **d == 0).count() {
        3 => return Octant::Equilibrium,
        2 => return Octant::Singling,
        1 => return Octant::Confused,
        _ => {}
    }

    match (d1 > 0, d2 > 0, d3 > 0) {
        (true, true, true) => Octant::Drifter,
        (true, true, false) => Octant::Iconoclast,
        (true, false, true) => Octant::Mystic,
        (true, false, false) => Octant::Zealot,
        (false, true, true) => Octant::Seeker,
        (false, true, false) => Octant::Cynic,
        (false, false, true) => Octant::Devotee,
        (false, false, false) => Octant::Warden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_counts() {
        assert_eq!(classify(&Point::ORIGIN), Octant::Equilibrium);
        assert_eq!(classify(&Point::new([5, 5, 9, 9, 1, 0])), Octant::Singling);
        assert_eq!(classify(&Point::new([5, 5, 9, 2, 1, 0])), Octant::Confused);
    }

    #[test]
    fn test_sign_table() {
        let cases = [
            ([9, 1, 9, 1, 9, 1], Octant::Drifter),
            ([9, 1, 9, 1, 1, 9], Octant::Iconoclast),
            ([9, 1, 1, 9, 9, 1], Octant::Mystic),
            ([9, 1, 1, 9, 1, 9], Octant::Zealot),
            ([1, 9, 9, 1, 9, 1], Octant::Seeker),
            ([1, 9, 9, 1, 1, 9], Octant::Cynic),
            ([1, 9, 1, 9, 9, 1], Octant::Devotee),
            ([1, 9, 1, 9, 1, 9], Octant::Warden),
        ];
        for (values, expected) in cases {
            assert_eq!(classify(&Point::new(values)), expected, "{:?}", values);
        }
    }

    #[test]
    fn test_generated_points() {
        assert_eq!(classify(&Point::new([47, 50, 59, 48, 61, 51])), Octant::Seeker);
        assert_eq!(classify(&Point::new([36, 10, 80, 63, 39, 28])), Octant::Drifter);
    }

    #[test]
    fn test_serialized_name() {
        assert_eq!(serde_json::to_string(&Octant::Warden).unwrap(), "\"warden\"");
        assert_eq!(Octant::Iconoclast.to_string(), "iconoclast");
    }
}
