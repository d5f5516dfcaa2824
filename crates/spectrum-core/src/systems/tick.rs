//! Tick Scheduler
//!
//! One full simulation step: headings, then item claims, then zones.

use std::collections::BTreeMap;
use std::time::Instant;

use spectrum_events::TickStats;

use crate::actions::movement::move_toward_point;
use crate::components::point::{AxisSet, Point};
use crate::context::Spectrum;
use crate::error::Result;
use crate::systems::headings::{default_heading, resolve, EffectiveHeading};
use crate::systems::items::claim_items;
use crate::systems::zones::{apply_effects, members};

/// What the heading pass did for one identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Moved,
    Affixed,
    Drifted,
    Failed,
}

/// Runs one tick. Ticks are serialized; a concurrent caller waits.
///
/// Per-identity and per-zone failures are counted in the returned stats
/// and never stop the tick. Failing to list identities or headings does.
pub fn run_tick(ctx: &Spectrum) -> Result<TickStats> {
    let _guard = ctx.lock_tick();
    let tick = ctx.advance_tick();
    let started = Instant::now();
    let mut stats = TickStats::new(tick);

    // Every identity gets a point, and targets are aimed at where they
    // stood when the tick began, whatever order identities are visited in.
    let identities = ctx.membership_candidates()?;
    let mut positions = BTreeMap::new();
    for identity in &identities {
        match ctx.point_of(identity) {
            Ok(point) => {
                positions.insert(identity.clone(), point);
            }
            Err(e) => tracing::warn!("tick {}: could not initialize {}: {}", tick, identity, e),
        }
    }
    let is_identity = |id: &str| {
        positions.contains_key(id)
            || ctx.is_known_identity(id).unwrap_or_else(|e| {
                tracing::warn!("tick {}: could not look up {}: {}", tick, id, e);
                false
            })
    };

    let headings = ctx.persistence().all_headings()?;
    let default = default_heading(headings.values().map(String::as_str));
    if let Some(heading) = &default {
        tracing::debug!("tick {}: default heading {}", tick, heading);
    }

    for identity in &identities {
        stats.identities += 1;
        let outcome = if ctx.store().is_keeper(identity) {
            Outcome::Affixed
        } else {
            let effective = resolve(
                headings.get(identity).map(String::as_str),
                default.as_ref(),
                ctx.keeper(),
                is_identity,
            );
            step(ctx, identity, effective, &positions)
        };
        match outcome {
            Outcome::Moved => stats.moved += 1,
            Outcome::Affixed => stats.affixed += 1,
            Outcome::Drifted => stats.drifted += 1,
            Outcome::Failed => stats.failed += 1,
        }
    }

    let points: BTreeMap<String, Point> = match ctx.store().all() {
        Ok(points) => points,
        Err(e) => {
            tracing::warn!("tick {}: item pass skipped: {}", tick, e);
            BTreeMap::new()
        }
    };
    match claim_items(ctx, &points, tick) {
        Ok(report) => {
            stats.items_awarded = report.awarded.len();
            stats.failed += report.failed;
        }
        Err(e) => {
            stats.failed += 1;
            tracing::warn!("tick {}: item pass failed: {}", tick, e);
        }
    }

    run_zones(ctx, tick, &mut stats);

    tracing::info!(
        "Tick {}: {} identities, {} moved, {} affixed, {} drifted, {} failed, {} items, {} zone effects ({:?})",
        tick,
        stats.identities,
        stats.moved,
        stats.affixed,
        stats.drifted,
        stats.failed,
        stats.items_awarded,
        stats.zone_effects_applied,
        started.elapsed()
    );
    ctx.set_last_tick(stats);
    Ok(stats)
}

/// Applies one identity's effective heading.
fn step(
    ctx: &Spectrum,
    identity: &str,
    effective: EffectiveHeading,
    positions: &BTreeMap<String, Point>,
) -> Outcome {
    let fraction = ctx.config().tick.toward_fraction;
    let (result, heading) = match effective {
        EffectiveHeading::Hold => return Outcome::Affixed,
        EffectiveHeading::Drifting => return Outcome::Drifted,
        EffectiveHeading::Invalid(raw) => {
            tracing::debug!("{} has unparseable heading '{}', drifting", identity, raw);
            return Outcome::Drifted;
        }
        EffectiveHeading::Toward { target, heading } => {
            let result = match positions.get(&target) {
                Some(point) => move_toward_point(
                    ctx,
                    identity,
                    &target,
                    *point,
                    fraction,
                    AxisSet::all(),
                    &heading,
                ),
                None => ctx.move_toward(identity, &target, fraction, AxisSet::all(), &heading),
            };
            (result, heading)
        }
        EffectiveHeading::Step { axis, heading } => {
            let deltas = BTreeMap::from([(axis, ctx.config().tick.axis_step)]);
            (ctx.move_by_delta(identity, &deltas, &heading), heading)
        }
    };

    match result {
        Ok(_) => Outcome::Moved,
        Err(e) => {
            tracing::warn!("{} failed to follow {}: {}", identity, heading, e);
            Outcome::Failed
        }
    }
}

fn run_zones(ctx: &Spectrum, tick: u64, stats: &mut TickStats) {
    let zones = match ctx.list_zones() {
        Ok(zones) => zones,
        Err(e) => {
            stats.zone_effects_failed += 1;
            tracing::warn!("tick {}: zone pass skipped: {}", tick, e);
            return;
        }
    };

    let now = Instant::now();
    for zone in zones.iter().filter(|zone| zone.enabled) {
        if zone.effects.is_empty() {
            continue;
        }
        match members(ctx, zone, now) {
            Ok(found) => {
                let report = apply_effects(ctx, zone, &found, tick);
                stats.zone_effects_applied += report.applied;
                stats.zone_effects_failed += report.failed;
            }
            Err(e) => {
                stats.zone_effects_failed += 1;
                tracing::warn!("tick {}: zone {} skipped: {}", tick, zone.id, e);
            }
        }
    }
}
