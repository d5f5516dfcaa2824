//! Item Claims
//!
//! Awards unowned items to the unique nearest identity within reach.

use std::collections::BTreeMap;

use spectrum_events::{HistoryEventBuilder, HistoryKind};

use crate::components::item::WorldItem;
use crate::components::point::Point;
use crate::context::Spectrum;
use crate::error::Result;
use crate::geometry::distance;

/// Results of one item pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimReport {
    /// (item id, new owner)
    pub awarded: Vec<(String, String)>,
    pub failed: usize,
}

/// The single identity closest to the item within its claim radius.
///
/// `None` when nobody is in reach or the nearest distance is shared.
pub fn nearest_claimant(
    item: &WorldItem,
    points: &BTreeMap<String, Point>,
    keeper: &str,
) -> Option<String> {
    let mut best: Option<(f64, &str)> = None;
    let mut tied = false;
    for (identity, point) in points {
        if identity == keeper {
            continue;
        }
        let d = distance(&item.location, point, item.axes);
        if d > item.claim_radius {
            continue;
        }
        match best {
            Some((top, _)) if d > top => {}
            Some((top, _)) if d == top => tied = true,
            _ => {
                best = Some((d, identity));
                tied = false;
            }
        }
    }
    match best {
        Some((_, identity)) if !tied => Some(identity.to_string()),
        _ => None,
    }
}

/// Runs the claim pass over every unowned item.
///
/// Claims go through the storage compare-and-set, so an item is awarded at
/// most once even if another writer races this pass. The owner and reward
/// are written together; a failed write leaves the item for the next pass.
pub fn claim_items(
    ctx: &Spectrum,
    points: &BTreeMap<String, Point>,
    tick: u64,
) -> Result<ClaimReport> {
    let _guard = ctx.lock_items();
    let mut report = ClaimReport::default();

    for item in ctx.persistence().unclaimed_items()? {
        let Some(identity) = nearest_claimant(&item, points, ctx.keeper()) else {
            continue;
        };
        match award(ctx, &item, &identity, tick) {
            Ok(true) => report.awarded.push((item.id.clone(), identity)),
            Ok(false) => tracing::debug!("item {} was claimed elsewhere first", item.id),
            Err(e) => {
                report.failed += 1;
                tracing::warn!("claiming item {} for {} failed: {}", item.id, identity, e);
            }
        }
    }
    Ok(report)
}

fn award(ctx: &Spectrum, item: &WorldItem, identity: &str, tick: u64) -> Result<bool> {
    if !ctx
        .persistence()
        .claim_item(&item.id, identity, item.reward)?
    {
        return Ok(false);
    }
    tracing::info!("{} claimed {} at tick {}", identity, item.name, tick);
    let event = HistoryEventBuilder::new(HistoryKind::ItemClaimed, identity)
        .item(item.id.as_str())
        .title(format!("Claimed {}", item.name))
        .reward(item.reward)
        .once_key(format!("item:{}", item.id));
    // Ownership and reward are already stored.
    if let Err(e) = ctx.emit_at(event, tick) {
        tracing::warn!("claim of {} by {} not recorded: {}", item.id, identity, e);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::point::{Axis, AxisSet};

    fn points(entries: &[(&str, [i32; 6])]) -> BTreeMap<String, Point> {
        entries
            .iter()
            .map(|(id, values)| (id.to_string(), Point::new(*values)))
            .collect()
    }

    #[test]
    fn test_unique_nearest_within_radius() {
        let item = WorldItem::new("item_a", "A", Point::new([50; 6]), 5.0, 1);
        let pts = points(&[
            ("near@x.y", [50, 50, 50, 50, 50, 52]),
            ("nearer@x.y", [50, 50, 50, 50, 50, 51]),
            ("far@x.y", [90; 6]),
        ]);
        assert_eq!(
            nearest_claimant(&item, &pts, "keeper@x.y"),
            Some("nearer@x.y".into())
        );
    }

    #[test]
    fn test_radius_is_inclusive() {
        let item = WorldItem::new("item_a", "A", Point::new([50; 6]), 3.0, 1);
        let pts = points(&[("edge@x.y", [53, 50, 50, 50, 50, 50])]);
        assert_eq!(nearest_claimant(&item, &pts, "k@x.y"), Some("edge@x.y".into()));
    }

    #[test]
    fn test_tie_means_no_claim() {
        let item = WorldItem::new("item_a", "A", Point::new([50; 6]), 5.0, 1);
        let pts = points(&[
            ("left@x.y", [49, 50, 50, 50, 50, 50]),
            ("right@x.y", [51, 50, 50, 50, 50, 50]),
        ]);
        assert_eq!(nearest_claimant(&item, &pts, "k@x.y"), None);
    }

    #[test]
    fn test_tie_broken_by_closer_identity() {
        let item = WorldItem::new("item_a", "A", Point::new([50; 6]), 5.0, 1);
        let pts = points(&[
            ("a@x.y", [52, 50, 50, 50, 50, 50]),
            ("b@x.y", [48, 50, 50, 50, 50, 50]),
            ("c@x.y", [50, 50, 50, 50, 50, 51]),
        ]);
        assert_eq!(nearest_claimant(&item, &pts, "k@x.y"), Some("c@x.y".into()));
    }

    #[test]
    fn test_keeper_never_claims() {
        let item = WorldItem::new("item_a", "A", Point::ORIGIN, 5.0, 1);
        let pts = points(&[("k@x.y", [0; 6])]);
        assert_eq!(nearest_claimant(&item, &pts, "k@x.y"), None);
    }

    #[test]
    fn test_item_axes_limit_distance() {
        let item = WorldItem::new("item_a", "A", Point::new([50; 6]), 1.0, 1)
            .with_axes(AxisSet::only(Axis::Entropy));
        let pts = points(&[("a@x.y", [50, 0, 0, 0, 0, 0])]);
        assert_eq!(nearest_claimant(&item, &pts, "k@x.y"), Some("a@x.y".into()));
    }
}
