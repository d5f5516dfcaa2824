//! Movement Operators
//!
//! Every operator is atomic on the identity it moves: the read-modify-write
//! runs under that identity's lock. Retries are not deduplicated.

use serde::Serialize;
use std::collections::BTreeMap;

use spectrum_events::{HistoryEventBuilder, HistoryKind};

use crate::components::identity::WeightCategory;
use crate::components::point::{Axis, AxisSet, Point};
use crate::context::Spectrum;
use crate::error::{Result, SpectrumError};
use crate::geometry::{distance, interpolate};

/// How far a `move_toward` got relative to its target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetApproach {
    pub target: String,
    pub initial_distance: f64,
    pub final_distance: f64,
}

/// Outcome of a movement operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementResult {
    pub identity: String,
    pub reason: String,
    pub before: Point,
    pub after: Point,
    /// Per-axis change after clamping; axes that did not change are omitted
    pub actual_delta: BTreeMap<Axis, i32>,
    /// Euclidean distance between `before` and `after` over all axes
    pub distance_moved: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approach: Option<TargetApproach>,
}

impl MovementResult {
    fn new(identity: &str, reason: &str, before: Point, after: Point) -> Self {
        let actual_delta = Axis::ALL
            .into_iter()
            .filter_map(|axis| {
                let delta = after.get(axis) - before.get(axis);
                (delta != 0).then_some((axis, delta))
            })
            .collect();
        Self {
            identity: identity.to_string(),
            reason: reason.to_string(),
            before,
            after,
            actual_delta,
            distance_moved: distance(&before, &after, AxisSet::all()),
            approach: None,
        }
    }

    pub fn moved(&self) -> bool {
        self.before != self.after
    }
}

/// An identity found by [`radius_query`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub identity: String,
    pub distance: f64,
}

fn reject_keeper(ctx: &Spectrum, identity: &str) -> Result<()> {
    if ctx.store().is_keeper(identity) {
        return Err(SpectrumError::KeeperImmutable(identity.to_string()));
    }
    Ok(())
}

/// Applies `transform` to the identity's current point under its lock.
fn update_point(
    ctx: &Spectrum,
    identity: &str,
    reason: &str,
    transform: impl FnOnce(Point) -> Point,
) -> Result<MovementResult> {
    reject_keeper(ctx, identity)?;
    ctx.point_of(identity)?;

    let store = ctx.store();
    let result = store.with_identity_lock(identity, || {
        let before = store.get(identity)?;
        let after = transform(before);
        store.put(identity, after)?;
        Ok::<_, SpectrumError>(MovementResult::new(identity, reason, before, after))
    })?;

    tracing::debug!(
        identity,
        reason,
        before = %result.before,
        after = %result.after,
        "moved"
    );
    Ok(result)
}

/// Adds a per-axis delta; each axis is clamped independently.
pub fn move_by_delta(
    ctx: &Spectrum,
    identity: &str,
    deltas: &BTreeMap<Axis, i32>,
    reason: &str,
) -> Result<MovementResult> {
    update_point(ctx, identity, reason, |point| {
        deltas.iter().fold(point, |acc, (axis, delta)| {
            acc.with(*axis, acc.get(*axis).saturating_add(*delta))
        })
    })
}

/// Sets the listed axes to absolute (clamped) values.
pub fn set_absolute(
    ctx: &Spectrum,
    identity: &str,
    values: &BTreeMap<Axis, i32>,
    reason: &str,
) -> Result<MovementResult> {
    update_point(ctx, identity, reason, |point| {
        values
            .iter()
            .fold(point, |acc, (axis, value)| acc.with(*axis, *value))
    })
}

/// Moves `fraction` of the way toward `target` on the selected axes.
///
/// The target may be any identity, the Keeper included; unselected axes are
/// left alone. Fractions outside [0,1] are rejected.
pub fn move_toward(
    ctx: &Spectrum,
    identity: &str,
    target: &str,
    fraction: f64,
    axes: AxisSet,
    reason: &str,
) -> Result<MovementResult> {
    let target_point = ctx.point_of(target)?;
    move_toward_point(ctx, identity, target, target_point, fraction, axes, reason)
}

/// Like [`move_toward`], against a target position the caller already holds.
///
/// The tick uses this to aim at where targets stood when it started.
pub fn move_toward_point(
    ctx: &Spectrum,
    identity: &str,
    target: &str,
    target_point: Point,
    fraction: f64,
    axes: AxisSet,
    reason: &str,
) -> Result<MovementResult> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(SpectrumError::InvalidArgument(format!(
            "fraction {} is outside [0, 1]",
            fraction
        )));
    }
    reject_keeper(ctx, identity)?;

    let mut result = update_point(ctx, identity, reason, |point| {
        axes.iter().fold(point, |acc, axis| {
            acc.with(
                axis,
                interpolate(acc.get(axis), target_point.get(axis), fraction),
            )
        })
    })?;
    result.approach = Some(TargetApproach {
        target: target.to_string(),
        initial_distance: distance(&result.before, &target_point, axes),
        final_distance: distance(&result.after, &target_point, axes),
    });
    Ok(result)
}

/// Overwrites the identity's point with its freshly generated one and
/// records a reset event.
pub fn reset_to_origin(
    ctx: &Spectrum,
    identity: &str,
    category: Option<WeightCategory>,
    reason: &str,
) -> Result<MovementResult> {
    reject_keeper(ctx, identity)?;
    ctx.point_of(identity)?;
    let generated = ctx.store().generator().generate(identity, category);

    let store = ctx.store();
    let result = store.with_identity_lock(identity, || {
        let before = store.try_get(identity)?.unwrap_or(generated);
        store.put(identity, generated)?;
        Ok::<_, SpectrumError>(MovementResult::new(identity, reason, before, generated))
    })?;

    // The point is already stored; a lost history entry does not undo it.
    if let Err(e) = ctx.emit(
        HistoryEventBuilder::new(HistoryKind::Reset, identity)
            .title("Returned to origin point")
            .description(reason),
    ) {
        tracing::warn!("reset of {} stored but not recorded: {}", identity, e);
    }
    tracing::info!(identity, reason, point = %generated, "reset to generated point");
    Ok(result)
}

/// Identities within `radius` (inclusive) of `center`, nearest first.
///
/// Searches the same candidates as zone membership, so directory
/// identities count whether or not they have been referenced yet. Ties on
/// distance are ordered by identity. The center itself is excluded.
pub fn radius_query(
    ctx: &Spectrum,
    center: &str,
    radius: f64,
    axes: AxisSet,
    limit: Option<usize>,
) -> Result<Vec<Neighbor>> {
    let origin = ctx.point_of(center)?;
    let mut neighbors: Vec<Neighbor> = ctx
        .candidate_points()?
        .into_iter()
        .filter(|(identity, _)| identity != center)
        .map(|(identity, point)| Neighbor {
            distance: distance(&origin, &point, axes),
            identity,
        })
        .filter(|neighbor| neighbor.distance <= radius)
        .collect();

    neighbors.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.identity.cmp(&b.identity))
    });
    if let Some(limit) = limit {
        neighbors.truncate(limit);
    }
    Ok(neighbors)
}

/// Distance between two identities' points.
pub fn distance_between(ctx: &Spectrum, a: &str, b: &str, axes: AxisSet) -> Result<f64> {
    let first = ctx.point_of(a)?;
    let second = ctx.point_of(b)?;
    Ok(distance(&first, &second, axes))
}
