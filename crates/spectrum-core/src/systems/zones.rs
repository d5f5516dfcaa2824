//! Zone Engine
//!
//! Membership tests for sphere and hull zones, and application of zone
//! effects to members.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use spectrum_events::{HistoryEventBuilder, HistoryKind};

use crate::components::point::Point;
use crate::components::zone::{Anchor, Zone, ZoneEffect, ZoneShape};
use crate::context::Spectrum;
use crate::error::{Result, SpectrumError};
use crate::geometry::distance;
use crate::hull::HullGeometry;

/// A zone member. Sphere members carry their distance to the center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneMember {
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Effect applications for one zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectReport {
    pub applied: usize,
    pub failed: usize,
}

/// Where an anchor currently is. Unknown identities resolve to `None`.
pub fn resolve_anchor(ctx: &Spectrum, anchor: &Anchor) -> Result<Option<Point>> {
    match anchor {
        Anchor::Fixed(point) => Ok(Some(*point)),
        Anchor::Identity(identity) => match ctx.point_of(identity) {
            Ok(point) => Ok(Some(point)),
            Err(SpectrumError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        },
    }
}

fn build_hull(ctx: &Spectrum, zone: &Zone, vertices: &[Anchor]) -> Result<HullGeometry> {
    let mut resolved = Vec::with_capacity(vertices.len());
    for anchor in vertices {
        match resolve_anchor(ctx, anchor)? {
            Some(point) => resolved.push(point),
            None => tracing::debug!("zone {}: skipping unresolvable vertex {:?}", zone.id, anchor),
        }
    }
    if resolved.len() < 4 {
        return Err(SpectrumError::InsufficientHullPoints {
            zone_id: zone.id.clone(),
            found: resolved.len(),
        });
    }
    let settings = &ctx.config().zones;
    HullGeometry::build(
        &resolved,
        zone.axes,
        settings.max_hull_points,
        settings.boundary_epsilon,
    )
    .map_err(|e| SpectrumError::HullTooComplex {
        zone_id: zone.id.clone(),
        vertices: e.vertices,
        max_points: e.max_points,
    })
}

/// Cached geometry for a hull zone. Too few resolvable vertices yields an
/// empty hull rather than an error.
pub fn hull_geometry(
    ctx: &Spectrum,
    zone: &Zone,
    vertices: &[Anchor],
    now: Instant,
) -> Result<Arc<HullGeometry>> {
    ctx.hulls().get_or_build(&zone.id, now, || {
        match build_hull(ctx, zone, vertices) {
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}, treating zone as empty", e);
                Ok(HullGeometry::empty(zone.axes))
            }
            other => other,
        }
    })
}

/// Whether an identity is inside a zone. Disabled zones contain nothing.
pub fn contains(ctx: &Spectrum, zone: &Zone, identity: &str, now: Instant) -> Result<bool> {
    if !zone.enabled {
        return Ok(false);
    }
    let point = ctx.point_of(identity)?;
    match &zone.shape {
        ZoneShape::Sphere { center, radius } => {
            let Some(center) = resolve_anchor(ctx, center)? else {
                return Ok(false);
            };
            Ok(distance(&point, &center, zone.axes) <= *radius)
        }
        ZoneShape::Hull { vertices } => {
            Ok(hull_geometry(ctx, zone, vertices, now)?.contains(&point))
        }
    }
}

/// Members of a zone.
///
/// Sphere members are ordered by distance to the center, then identity.
/// Hull members are in identity order and carry no distance.
pub fn members(ctx: &Spectrum, zone: &Zone, now: Instant) -> Result<Vec<ZoneMember>> {
    if !zone.enabled {
        return Ok(Vec::new());
    }
    let points = ctx.candidate_points()?;

    match &zone.shape {
        ZoneShape::Sphere { center, radius } => {
            let Some(center) = resolve_anchor(ctx, center)? else {
                tracing::warn!("zone {}: center {:?} not found", zone.id, center);
                return Ok(Vec::new());
            };
            let mut members: Vec<ZoneMember> = points
                .into_iter()
                .filter_map(|(identity, point)| {
                    let d = distance(&point, &center, zone.axes);
                    (d <= *radius).then_some(ZoneMember {
                        identity,
                        distance: Some(d),
                    })
                })
                .collect();
            members.sort_by(|a, b| {
                a.distance
                    .unwrap_or_default()
                    .total_cmp(&b.distance.unwrap_or_default())
                    .then_with(|| a.identity.cmp(&b.identity))
            });
            Ok(members)
        }
        ZoneShape::Hull { vertices } => {
            let geometry = hull_geometry(ctx, zone, vertices, now)?;
            Ok(points
                .into_iter()
                .filter(|(_, point)| geometry.contains(point))
                .map(|(identity, _)| ZoneMember {
                    identity,
                    distance: None,
                })
                .collect())
        }
    }
}

/// Applies every effect of a zone to every member, in order.
///
/// A failing member/effect pair is logged and counted; the rest still run.
pub fn apply_effects(
    ctx: &Spectrum,
    zone: &Zone,
    members: &[ZoneMember],
    tick: u64,
) -> EffectReport {
    let mut report = EffectReport::default();
    for member in members {
        for (index, effect) in zone.effects.iter().enumerate() {
            match apply_effect(ctx, zone, index, effect, &member.identity, tick) {
                Ok(true) => report.applied += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "zone {} effect {} failed for {}: {}",
                        zone.id,
                        index,
                        member.identity,
                        e
                    );
                }
            }
        }
    }
    report
}

/// Returns whether the effect did anything.
fn apply_effect(
    ctx: &Spectrum,
    zone: &Zone,
    index: usize,
    effect: &ZoneEffect,
    identity: &str,
    tick: u64,
) -> Result<bool> {
    match effect {
        ZoneEffect::Drift { axis, delta } => {
            if ctx.store().is_keeper(identity) {
                return Ok(false);
            }
            let deltas = BTreeMap::from([(*axis, *delta)]);
            let reason = format!("zone:{}", zone.id);
            ctx.move_by_delta(identity, &deltas, &reason)?;
            Ok(true)
        }
        ZoneEffect::Canon {
            title,
            description,
            once,
        } => {
            let mut builder = HistoryEventBuilder::new(HistoryKind::Canon, identity)
                .zone(zone.id.as_str())
                .title(title.as_str());
            if let Some(description) = description {
                builder = builder.description(description.as_str());
            }
            if *once {
                builder = builder.once_key(format!("canon:{}:{}:{}", zone.id, index, identity));
            }
            ctx.emit_at(builder, tick)
        }
        ZoneEffect::HeadingOverride { heading } => {
            let heading = ctx.parse_heading(heading)?;
            let canonical = heading.to_string();
            ctx.persistence().save_heading(identity, &canonical)?;
            ctx.emit_at(
                HistoryEventBuilder::new(HistoryKind::HeadingOverride, identity)
                    .zone(zone.id.as_str())
                    .title(format!("Heading set by {}", zone.name))
                    .description(canonical),
                tick,
            )?;
            Ok(true)
        }
    }
}
