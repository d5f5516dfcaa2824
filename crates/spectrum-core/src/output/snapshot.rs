//! Snapshot Output
//!
//! Builds a [`SpectrumSnapshot`] of the live simulation and writes it out.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use spectrum_events::{
    generate_snapshot_id, IdentitySnapshot, ItemSnapshot, SpectrumSnapshot, ZoneSnapshot,
};

use crate::context::Spectrum;
use crate::error::Result;
use crate::octant::classify;
use crate::systems::zones::members;

static SNAPSHOT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Captures every stored point, zone membership and item owner.
pub fn build_snapshot(ctx: &Spectrum) -> Result<SpectrumSnapshot> {
    let headings = ctx.persistence().all_headings()?;

    let identities = ctx
        .store()
        .all()?
        .into_iter()
        .map(|(identity, point)| IdentitySnapshot {
            axes: point.to_named_map(),
            octant: classify(&point).to_string(),
            heading: headings.get(&identity).cloned(),
            identity,
        })
        .collect();

    let now = Instant::now();
    let mut zones = Vec::new();
    for zone in ctx.list_zones()? {
        let found = match members(ctx, &zone, now) {
            Ok(found) => found.into_iter().map(|m| m.identity).collect(),
            Err(e) => {
                tracing::warn!("snapshot: members of zone {} unavailable: {}", zone.id, e);
                Vec::new()
            }
        };
        zones.push(ZoneSnapshot {
            zone_id: zone.id.clone(),
            name: zone.name.clone(),
            shape: zone.shape_name().to_string(),
            members: found,
        });
    }

    let items = ctx
        .items()?
        .into_iter()
        .map(|item| ItemSnapshot {
            item_id: item.id,
            name: item.name,
            owner: item.owner,
        })
        .collect();

    Ok(SpectrumSnapshot {
        snapshot_id: generate_snapshot_id(SNAPSHOT_SEQ.fetch_add(1, Ordering::Relaxed)),
        tick: ctx.current_tick(),
        keeper: ctx.keeper().to_string(),
        identities,
        zones,
        items,
        last_tick: ctx.last_tick(),
    })
}

/// Write a snapshot as pretty JSON, creating parent directories.
pub fn write_snapshot(snapshot: &SpectrumSnapshot, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::identity::{IdentityRecord, WeightCategory};
    use crate::components::item::WorldItem;
    use crate::components::point::{AxisSet, Point};
    use crate::components::zone::Anchor;
    use crate::config::SpectrumConfig;
    use crate::persistence::{MemoryDirectory, MemoryHistory, MemoryPersistence};
    use std::sync::Arc;

    fn spectrum() -> Spectrum {
        let directory = MemoryDirectory::with_records([
            IdentityRecord::new("alice@spectrum.social").with_category(WeightCategory::Local),
            IdentityRecord::new("bob@elsewhere.net").with_category(WeightCategory::Remote),
        ]);
        Spectrum::new(
            SpectrumConfig::default(),
            Arc::new(MemoryPersistence::new()),
            Arc::new(directory),
            Arc::new(MemoryHistory::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_contents() {
        let ctx = spectrum();
        ctx.set_heading("alice@spectrum.social", "origin").unwrap();
        ctx.get_point("bob@elsewhere.net").unwrap();
        ctx.create_sphere_zone(
            "Around Alice",
            Anchor::identity("alice@spectrum.social"),
            1.0,
            AxisSet::all(),
            Vec::new(),
        )
        .unwrap();
        ctx.add_item(WorldItem::new("item_lantern", "Lantern", Point::new([90; 6]), 1.0, 5))
            .unwrap();

        let snapshot = build_snapshot(&ctx).unwrap();
        assert_eq!(snapshot.keeper, "keeper@spectrum.local");
        assert_eq!(snapshot.identities.len(), 3);

        let alice = snapshot.identity("alice@spectrum.social").unwrap();
        assert_eq!(alice.octant, "seeker");
        assert_eq!(alice.axes["entropy"], 47);
        assert_eq!(alice.heading.as_deref(), Some("origin"));
        assert_eq!(snapshot.identity("keeper@spectrum.local").unwrap().octant, "equilibrium");

        assert_eq!(snapshot.zones[0].members, vec!["alice@spectrum.social".to_string()]);
        assert_eq!(snapshot.items[0].owner, None);
        assert!(snapshot.last_tick.is_none());
    }

    #[test]
    fn test_write_snapshot() {
        let ctx = spectrum();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        write_snapshot(&build_snapshot(&ctx).unwrap(), &path).unwrap();
        let parsed: SpectrumSnapshot =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.keeper, "keeper@spectrum.local");
    }
}
