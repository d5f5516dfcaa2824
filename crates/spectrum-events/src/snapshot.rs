//! Snapshot Types
//!
//! Serialization structs for spectrum snapshots and per-tick statistics.
//!
//! Snapshots capture the positions, headings and zone memberships at a point
//! in time, used for analysis and for handing state to outer layers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Counters for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub tick: u64,
    /// Identities visited by the heading pass
    pub identities: usize,
    pub moved: usize,
    pub affixed: usize,
    /// No effective heading, or an unparseable one
    pub drifted: usize,
    pub failed: usize,
    pub items_awarded: usize,
    pub zone_effects_applied: usize,
    pub zone_effects_failed: usize,
}

impl TickStats {
    /// Creates empty stats for a tick.
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Total failures across the heading and zone passes.
    pub fn total_failures(&self) -> usize {
        self.failed + self.zone_effects_failed
    }
}

/// One identity's position at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    pub identity: String,
    /// Axis name -> value
    pub axes: BTreeMap<String, i32>,
    pub octant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

/// Zone membership at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub zone_id: String,
    pub name: String,
    /// "sphere" or "hull"
    pub shape: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// World item ownership at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub item_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Complete spectrum snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSnapshot {
    pub snapshot_id: String,
    pub tick: u64,
    pub keeper: String,
    #[serde(default)]
    pub identities: Vec<IdentitySnapshot>,
    #[serde(default)]
    pub zones: Vec<ZoneSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tick: Option<TickStats>,
}

impl SpectrumSnapshot {
    /// Looks up an identity by id.
    pub fn identity(&self, identity: &str) -> Option<&IdentitySnapshot> {
        self.identities.iter().find(|i| i.identity == identity)
    }

    /// Looks up a zone by id.
    pub fn zone(&self, zone_id: &str) -> Option<&ZoneSnapshot> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }

    /// Counts identities per octant label.
    pub fn octant_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for identity in &self.identities {
            *counts.entry(identity.octant.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_generate_snapshot_id() {
        assert_eq!(generate_snapshot_id(7), "snap_000007");
    }

    #[test]
    fn test_tick_stats_failures() {
        let mut stats = TickStats::new(3);
        stats.failed = 2;
        stats.zone_effects_failed = 1;
        assert_eq!(stats.tick, 3);
        assert_eq!(stats.total_failures(), 3);
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = fixtures::sample_snapshot();

        let keeper = snapshot.identity(&snapshot.keeper).unwrap();
        assert!(keeper.axes.values().all(|v| *v == 0));
        assert_eq!(keeper.octant, "equilibrium");

        let zone = snapshot.zone("zone_commons").unwrap();
        assert_eq!(zone.shape, "sphere");
        assert!(snapshot.zone("zone_missing").is_none());
    }

    #[test]
    fn test_octant_counts() {
        let snapshot = fixtures::sample_snapshot();
        let counts = snapshot.octant_counts();
        let total: usize = counts.values().sum();
        assert_eq!(total, snapshot.identities.len());
        assert_eq!(counts.get("equilibrium"), Some(&1));
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = fixtures::sample_snapshot();
        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let parsed: SpectrumSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
