//! Zone Components
//!
//! Spherical and convex-hull regions of spectrum space, and the effects
//! they apply to their members each tick.

use serde::{Deserialize, Serialize};

use crate::components::point::{Axis, AxisSet, Point};

/// A point a zone is built from: fixed, or wherever an identity currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Anchor {
    Identity(String),
    Fixed(Point),
}

impl Anchor {
    pub fn identity(identity: impl Into<String>) -> Self {
        Anchor::Identity(identity.into())
    }
}

impl From<Point> for Anchor {
    fn from(point: Point) -> Self {
        Anchor::Fixed(point)
    }
}

/// Region shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneShape {
    Sphere { center: Anchor, radius: f64 },
    Hull { vertices: Vec<Anchor> },
}

/// Something a zone does to each of its members during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneEffect {
    /// Nudge one axis
    Drift { axis: Axis, delta: i32 },
    /// Record a history event for the member
    Canon {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Record at most once per member
        #[serde(default)]
        once: bool,
    },
    /// Replace the member's stored heading
    HeadingOverride { heading: String },
}

fn default_enabled() -> bool {
    true
}

/// A named region with ordered effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub shape: ZoneShape,
    /// Axes membership is measured on
    #[serde(default)]
    pub axes: AxisSet,
    #[serde(default)]
    pub effects: Vec<ZoneEffect>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Zone {
    pub fn sphere(
        id: impl Into<String>,
        name: impl Into<String>,
        center: Anchor,
        radius: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shape: ZoneShape::Sphere { center, radius },
            axes: AxisSet::all(),
            effects: Vec::new(),
            enabled: true,
        }
    }

    pub fn hull(id: impl Into<String>, name: impl Into<String>, vertices: Vec<Anchor>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shape: ZoneShape::Hull { vertices },
            axes: AxisSet::all(),
            effects: Vec::new(),
            enabled: true,
        }
    }

    pub fn with_axes(mut self, axes: AxisSet) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_effect(mut self, effect: ZoneEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn shape_name(&self) -> &'static str {
        match self.shape {
            ZoneShape::Sphere { .. } => "sphere",
            ZoneShape::Hull { .. } => "hull",
        }
    }

    pub fn is_hull(&self) -> bool {
        matches!(self.shape, ZoneShape::Hull { .. })
    }
}
