//! Spectrum Points
//!
//! The six named axes, axis subsets, and the clamped six-axis point.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseAxisError;
use crate::geometry::clamp;

/// Number of spectrum axes.
pub const AXIS_COUNT: usize = 6;

/// One spectrum axis. Axes come in three opposing pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Entropy,
    Oblivion,
    Liberty,
    Authority,
    Receptive,
    Skeptic,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; AXIS_COUNT] = [
        Axis::Entropy,
        Axis::Oblivion,
        Axis::Liberty,
        Axis::Authority,
        Axis::Receptive,
        Axis::Skeptic,
    ];

    /// Position of this axis in canonical order.
    pub fn index(self) -> usize {
        match self {
            Axis::Entropy => 0,
            Axis::Oblivion => 1,
            Axis::Liberty => 2,
            Axis::Authority => 3,
            Axis::Receptive => 4,
            Axis::Skeptic => 5,
        }
    }

    /// The paired axis on the other side of the same dimension.
    pub fn opposite(self) -> Axis {
        match self {
            Axis::Entropy => Axis::Oblivion,
            Axis::Oblivion => Axis::Entropy,
            Axis::Liberty => Axis::Authority,
            Axis::Authority => Axis::Liberty,
            Axis::Receptive => Axis::Skeptic,
            Axis::Skeptic => Axis::Receptive,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Entropy => "entropy",
            Axis::Oblivion => "oblivion",
            Axis::Liberty => "liberty",
            Axis::Authority => "authority",
            Axis::Receptive => "receptive",
            Axis::Skeptic => "skeptic",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Axis::ALL
            .iter()
            .copied()
            .find(|axis| axis.name() == lower)
            .ok_or_else(|| ParseAxisError(s.to_string()))
    }
}

/// A subset of axes.
///
/// Iteration is always in canonical order no matter how the set was built,
/// so every computation over a subset is independent of caller ordering.
/// Serialized as a list of axis names; an empty list reads back as all axes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisSet(u8);

impl AxisSet {
    const FULL_MASK: u8 = (1 << AXIS_COUNT) - 1;

    pub const fn all() -> Self {
        AxisSet(Self::FULL_MASK)
    }

    pub const fn empty() -> Self {
        AxisSet(0)
    }

    pub fn only(axis: Axis) -> Self {
        AxisSet(1 << axis.index())
    }

    pub fn insert(&mut self, axis: Axis) {
        self.0 |= 1 << axis.index();
    }

    pub fn with(mut self, axis: Axis) -> Self {
        self.insert(axis);
        self
    }

    pub fn contains(&self, axis: Axis) -> bool {
        self.0 & (1 << axis.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::FULL_MASK
    }

    /// Axes in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(move |axis| self.contains(*axis))
    }
}

impl Default for AxisSet {
    fn default() -> Self {
        AxisSet::all()
    }
}

impl FromIterator<Axis> for AxisSet {
    fn from_iter<I: IntoIterator<Item = Axis>>(iter: I) -> Self {
        let mut set = AxisSet::empty();
        for axis in iter {
            set.insert(axis);
        }
        set
    }
}

impl fmt::Debug for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Serialize for AxisSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let axes: Vec<Axis> = self.iter().collect();
        axes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AxisSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let axes = Vec::<Axis>::deserialize(deserializer)?;
        if axes.is_empty() {
            return Ok(AxisSet::all());
        }
        Ok(axes.into_iter().collect())
    }
}

/// A position in spectrum space. Every axis is within [0,100].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "NamedAxes", into = "NamedAxes")]
pub struct Point {
    values: [i32; AXIS_COUNT],
}

impl Point {
    /// The all-zero point the Keeper is pinned to.
    pub const ORIGIN: Point = Point {
        values: [0; AXIS_COUNT],
    };

    /// Builds a point, clamping every axis into bounds.
    pub fn new(values: [i32; AXIS_COUNT]) -> Self {
        Self {
            values: values.map(clamp),
        }
    }

    pub fn get(&self, axis: Axis) -> i32 {
        self.values[axis.index()]
    }

    /// Copy of this point with one axis replaced (clamped).
    pub fn with(mut self, axis: Axis, value: i32) -> Self {
        self.values[axis.index()] = clamp(value);
        self
    }

    pub fn values(&self) -> [i32; AXIS_COUNT] {
        self.values
    }

    pub fn is_origin(&self) -> bool {
        self.values == [0; AXIS_COUNT]
    }

    /// (axis, value) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, i32)> + '_ {
        Axis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }

    /// Axis name -> value, as used in snapshots.
    pub fn to_named_map(&self) -> BTreeMap<String, i32> {
        self.iter()
            .map(|(axis, value)| (axis.name().to_string(), value))
            .collect()
    }
}

impl Default for Point {
    fn default() -> Self {
        Point::ORIGIN
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point{:?}", self.values)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.values;
        write!(f, "({}, {}, {}, {}, {}, {})", a, b, c, d, e, g)
    }
}

/// Wire form of a point: all six axes by name, all required.
#[derive(Serialize, Deserialize)]
struct NamedAxes {
    entropy: i32,
    oblivion: i32,
    liberty: i32,
    authority: i32,
    receptive: i32,
    skeptic: i32,
}

impl From<NamedAxes> for Point {
    fn from(n: NamedAxes) -> Self {
        Point::new([
            n.entropy,
            n.oblivion,
            n.liberty,
            n.authority,
            n.receptive,
            n.skeptic,
        ])
    }
}

impl From<Point> for NamedAxes {
    fn from(p: Point) -> Self {
        let [entropy, oblivion, liberty, authority, receptive, skeptic] = p.values;
        NamedAxes {
            entropy,
            oblivion,
            liberty,
            authority,
            receptive,
            skeptic,
        }
    }
}
