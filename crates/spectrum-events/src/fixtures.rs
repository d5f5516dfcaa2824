//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // spectrum-events = { path = "../spectrum-events", features = ["test-fixtures"] }
//!
//! use spectrum_events::fixtures;
//!
//! let history = fixtures::sample_history();
//! let snapshot = fixtures::sample_snapshot();
//! ```

use std::collections::BTreeMap;

use crate::{
    generate_event_id, generate_snapshot_id, HistoryEvent, HistoryEventBuilder, HistoryKind,
    IdentitySnapshot, ItemSnapshot, SpectrumSnapshot, TickStats, ZoneSnapshot,
};

/// Keeper identity used throughout the fixtures.
pub const SAMPLE_KEEPER: &str = "keeper@spectrum.local";

const AXIS_NAMES: [&str; 6] = [
    "entropy",
    "oblivion",
    "liberty",
    "authority",
    "receptive",
    "skeptic",
];

fn axes(values: [i32; 6]) -> BTreeMap<String, i32> {
    AXIS_NAMES
        .iter()
        .zip(values)
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Returns sample history events.
///
/// Contains 4 events, one of each kind:
/// - 1 canon event (fire-once)
/// - 1 item claim with a reward
/// - 1 reset
/// - 1 heading override
pub fn sample_history() -> Vec<HistoryEvent> {
    vec![
        HistoryEventBuilder::new(HistoryKind::Canon, "alice@spectrum.social")
            .id(generate_event_id(1))
            .tick(3)
            .zone("zone_commons")
            .title("Entered the commons")
            .once_key("canon:zone_commons:0:alice@spectrum.social")
            .build(),
        HistoryEventBuilder::new(HistoryKind::ItemClaimed, "bob@elsewhere.net")
            .id(generate_event_id(2))
            .tick(5)
            .item("item_lantern")
            .title("Claimed the lantern")
            .reward(10)
            .once_key("item:item_lantern")
            .build(),
        HistoryEventBuilder::new(HistoryKind::Reset, "bob@elsewhere.net")
            .id(generate_event_id(3))
            .tick(8)
            .description("admin reset")
            .build(),
        HistoryEventBuilder::new(HistoryKind::HeadingOverride, "alice@spectrum.social")
            .id(generate_event_id(4))
            .tick(9)
            .zone("zone_commons")
            .description("origin")
            .build(),
    ]
}

/// Returns a sample snapshot.
///
/// Contains:
/// - the Keeper at the origin
/// - 2 ordinary identities
/// - 1 sphere zone and 1 item
pub fn sample_snapshot() -> SpectrumSnapshot {
    SpectrumSnapshot {
        snapshot_id: generate_snapshot_id(1),
        tick: 10,
        keeper: SAMPLE_KEEPER.to_string(),
        identities: vec![
            IdentitySnapshot {
                identity: SAMPLE_KEEPER.to_string(),
                axes: axes([0; 6]),
                octant: "equilibrium".to_string(),
                heading: None,
            },
            IdentitySnapshot {
                identity: "alice@spectrum.social".to_string(),
                axes: axes([47, 50, 59, 48, 61, 51]),
                octant: "seeker".to_string(),
                heading: Some("origin".to_string()),
            },
            IdentitySnapshot {
                identity: "bob@elsewhere.net".to_string(),
                axes: axes([36, 10, 80, 63, 39, 28]),
                octant: "drifter".to_string(),
                heading: Some("entropy+".to_string()),
            },
        ],
        zones: vec![ZoneSnapshot {
            zone_id: "zone_commons".to_string(),
            name: "The Commons".to_string(),
            shape: "sphere".to_string(),
            members: vec!["alice@spectrum.social".to_string()],
        }],
        items: vec![ItemSnapshot {
            item_id: "item_lantern".to_string(),
            name: "Lantern".to_string(),
            owner: Some("bob@elsewhere.net".to_string()),
        }],
        last_tick: Some(TickStats {
            tick: 10,
            identities: 3,
            moved: 2,
            affixed: 1,
            ..TickStats::default()
        }),
    }
}
