//! World Items
//!
//! Claimable objects placed in spectrum space.

use serde::{Deserialize, Serialize};

use crate::components::point::{AxisSet, Point};

/// An item the nearest identity within `claim_radius` can claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldItem {
    pub id: String,
    pub name: String,
    pub location: Point,
    /// Axes the claim distance is measured on
    #[serde(default)]
    pub axes: AxisSet,
    pub claim_radius: f64,
    pub reward: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl WorldItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Point,
        claim_radius: f64,
        reward: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            axes: AxisSet::all(),
            claim_radius,
            reward,
            owner: None,
        }
    }

    pub fn with_axes(mut self, axes: AxisSet) -> Self {
        self.axes = axes;
        self
    }

    pub fn is_claimed(&self) -> bool {
        self.owner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_is_unclaimed() {
        let item = WorldItem::new("item_lantern", "Lantern", Point::new([40; 6]), 5.0, 10);
        assert!(!item.is_claimed());
        assert!(item.axes.is_all());
    }

    #[test]
    fn test_owner_skipped_when_absent() {
        let item = WorldItem::new("item_lantern", "Lantern", Point::ORIGIN, 5.0, 10);
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("owner"));
    }
}
