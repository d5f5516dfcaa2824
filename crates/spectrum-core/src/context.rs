//! Spectrum Context
//!
//! The facade every operation runs through. A `Spectrum` owns its
//! configuration, the position store, the hull cache and the tick counter,
//! and is handed its storage, directory and history collaborators at
//! construction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use spectrum_events::{generate_event_id, HistoryEventBuilder, SpectrumSnapshot, TickStats};

use crate::actions::movement::{self, MovementResult, Neighbor};
use crate::components::heading::Heading;
use crate::components::identity::{normalize_identity, WeightCategory};
use crate::components::item::WorldItem;
use crate::components::point::{Axis, AxisSet, Point};
use crate::components::zone::{Anchor, Zone, ZoneEffect};
use crate::config::SpectrumConfig;
use crate::error::{Result, SpectrumError};
use crate::hull::HullCache;
use crate::output::snapshot::build_snapshot;
use crate::persistence::{HistoryRecorder, IdentityDirectory, Persistence};
use crate::store::PositionStore;
use crate::systems::tick;
use crate::systems::zones::{self, ZoneMember};

/// A running spectrum simulation.
pub struct Spectrum {
    config: SpectrumConfig,
    persistence: Arc<dyn Persistence>,
    directory: Arc<dyn IdentityDirectory>,
    history: Arc<dyn HistoryRecorder>,
    store: PositionStore,
    hulls: HullCache,
    tick: AtomicU64,
    event_seq: AtomicU64,
    last_tick: Mutex<Option<TickStats>>,
    tick_guard: Mutex<()>,
    item_guard: Mutex<()>,
}

impl Spectrum {
    /// Wires up a simulation and pins the Keeper at the origin.
    pub fn new(
        config: SpectrumConfig,
        persistence: Arc<dyn Persistence>,
        directory: Arc<dyn IdentityDirectory>,
        history: Arc<dyn HistoryRecorder>,
    ) -> Result<Self> {
        let keeper = normalize_identity(&config.keeper.identity).to_string();
        let store = PositionStore::new(keeper, Arc::clone(&persistence));
        store.seed_keeper()?;

        tracing::info!(
            "Spectrum ready: keeper {}, starting at tick {}",
            store.keeper(),
            config.tick.start_tick
        );

        Ok(Self {
            hulls: HullCache::new(config.zones.hull_cache_ttl()),
            tick: AtomicU64::new(config.tick.start_tick),
            event_seq: AtomicU64::new(1),
            last_tick: Mutex::new(None),
            tick_guard: Mutex::new(()),
            item_guard: Mutex::new(()),
            config,
            persistence,
            directory,
            history,
            store,
        })
    }

    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    pub fn keeper(&self) -> &str {
        self.store.keeper()
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn persistence(&self) -> &dyn Persistence {
        self.persistence.as_ref()
    }

    pub fn directory(&self) -> &dyn IdentityDirectory {
        self.directory.as_ref()
    }

    pub fn hulls(&self) -> &HullCache {
        &self.hulls
    }

    /// The tick the next `run_tick` will execute.
    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }

    /// Claims the current tick number and advances the counter.
    pub(crate) fn advance_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn lock_tick(&self) -> MutexGuard<'_, ()> {
        self.tick_guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock_items(&self) -> MutexGuard<'_, ()> {
        self.item_guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stats of the most recent tick, if any has run.
    pub fn last_tick(&self) -> Option<TickStats> {
        *self.last_tick.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_last_tick(&self, stats: TickStats) {
        *self.last_tick.lock().unwrap_or_else(PoisonError::into_inner) = Some(stats);
    }

    /// Weight category from the directory, falling back to the origins table.
    pub fn category_of(&self, identity: &str) -> Result<Option<WeightCategory>> {
        Ok(self
            .directory
            .lookup(identity)?
            .and_then(|record| record.resolved_category(&self.config.generator.origins)))
    }

    /// Point for an identity, generated lazily for directory identities.
    ///
    /// Identities with no stored point that the directory does not know
    /// are `NotFound`.
    pub fn point_of(&self, identity: &str) -> Result<Point> {
        if let Some(point) = self.store.try_get(identity)? {
            return Ok(point);
        }
        match self.directory.lookup(identity)? {
            Some(record) => {
                let category = record.resolved_category(&self.config.generator.origins);
                self.store.ensure(identity, category)
            }
            None => Err(SpectrumError::not_found("identity", identity)),
        }
    }

    /// Every directory identity plus the Keeper, sorted and deduplicated.
    pub fn membership_candidates(&self) -> Result<Vec<String>> {
        let mut identities: BTreeSet<String> = self
            .directory
            .identities()?
            .into_iter()
            .map(|record| record.identity)
            .collect();
        identities.insert(self.keeper().to_string());
        Ok(identities.into_iter().collect())
    }

    /// Points for every membership candidate, generating lazily.
    ///
    /// Candidates whose point cannot be produced are logged and skipped.
    pub fn candidate_points(&self) -> Result<BTreeMap<String, Point>> {
        let mut points = BTreeMap::new();
        for identity in self.membership_candidates()? {
            match self.point_of(&identity) {
                Ok(point) => {
                    points.insert(identity, point);
                }
                Err(e) => tracing::warn!("skipping {}: {}", identity, e),
            }
        }
        Ok(points)
    }

    /// Whether an id names the Keeper, a stored point or a directory entry.
    pub fn is_known_identity(&self, identity: &str) -> Result<bool> {
        if self.store.try_get(identity)?.is_some() {
            return Ok(true);
        }
        Ok(self.directory.lookup(identity)?.is_some())
    }

    /// Parses a heading, resolving ids outside the grammar against the
    /// known identities.
    pub fn parse_heading(&self, raw: &str) -> Result<Heading> {
        Heading::parse_with(raw, |id| self.is_known_identity(id))
    }

    /// Stamps an event with the next id and the current tick, then records it.
    ///
    /// Returns false when the recorder dropped a repeated once key.
    pub fn emit(&self, builder: HistoryEventBuilder) -> Result<bool> {
        self.emit_at(builder, self.current_tick())
    }

    pub(crate) fn emit_at(&self, builder: HistoryEventBuilder, tick: u64) -> Result<bool> {
        let sequence = self.event_seq.fetch_add(1, Ordering::SeqCst);
        let event = builder.id(generate_event_id(sequence)).tick(tick).build();
        Ok(self.history.record(&event)?)
    }

    // Positions and movement

    pub fn get_point(&self, identity: &str) -> Result<Point> {
        self.point_of(identity)
    }

    pub fn move_by_delta(
        &self,
        identity: &str,
        deltas: &BTreeMap<Axis, i32>,
        reason: &str,
    ) -> Result<MovementResult> {
        movement::move_by_delta(self, identity, deltas, reason)
    }

    pub fn set_absolute(
        &self,
        identity: &str,
        values: &BTreeMap<Axis, i32>,
        reason: &str,
    ) -> Result<MovementResult> {
        movement::set_absolute(self, identity, values, reason)
    }

    pub fn move_toward(
        &self,
        identity: &str,
        target: &str,
        fraction: f64,
        axes: AxisSet,
        reason: &str,
    ) -> Result<MovementResult> {
        movement::move_toward(self, identity, target, fraction, axes, reason)
    }

    pub fn reset_to_origin(
        &self,
        identity: &str,
        category: Option<WeightCategory>,
        reason: &str,
    ) -> Result<MovementResult> {
        movement::reset_to_origin(self, identity, category, reason)
    }

    pub fn distance_between(&self, a: &str, b: &str, axes: AxisSet) -> Result<f64> {
        movement::distance_between(self, a, b, axes)
    }

    pub fn radius_query(
        &self,
        center: &str,
        radius: f64,
        axes: AxisSet,
        limit: Option<usize>,
    ) -> Result<Vec<Neighbor>> {
        movement::radius_query(self, center, radius, axes, limit)
    }

    // Headings

    /// Validates and stores a heading in canonical form.
    pub fn set_heading(&self, identity: &str, raw: &str) -> Result<Heading> {
        let heading = self.parse_heading(raw)?;
        self.point_of(identity)?;
        self.persistence
            .save_heading(identity, &heading.to_string())?;
        tracing::debug!("{} now heading {}", identity, heading);
        Ok(heading)
    }

    pub fn get_heading(&self, identity: &str) -> Result<Option<String>> {
        Ok(self.persistence.load_heading(identity)?)
    }

    pub fn clear_heading(&self, identity: &str) -> Result<bool> {
        Ok(self.persistence.clear_heading(identity)?)
    }

    // Ticks

    pub fn run_tick(&self) -> Result<TickStats> {
        tick::run_tick(self)
    }

    // Zones

    pub fn create_sphere_zone(
        &self,
        name: impl Into<String>,
        center: Anchor,
        radius: f64,
        axes: AxisSet,
        effects: Vec<ZoneEffect>,
    ) -> Result<Zone> {
        let mut zone = Zone::sphere(new_zone_id(), name, center, radius).with_axes(axes);
        zone.effects = effects;
        self.save_zone(&zone)?;
        tracing::info!("Created sphere zone {} ({})", zone.id, zone.name);
        Ok(zone)
    }

    /// Creates a hull zone; at least four vertices are required.
    pub fn create_hull_zone(
        &self,
        name: impl Into<String>,
        vertices: Vec<Anchor>,
        axes: AxisSet,
        effects: Vec<ZoneEffect>,
    ) -> Result<Zone> {
        let id = new_zone_id();
        if vertices.len() < 4 {
            return Err(SpectrumError::InsufficientHullPoints {
                zone_id: id,
                found: vertices.len(),
            });
        }
        let mut zone = Zone::hull(id, name, vertices).with_axes(axes);
        zone.effects = effects;
        self.save_zone(&zone)?;
        tracing::info!("Created hull zone {} ({})", zone.id, zone.name);
        Ok(zone)
    }

    /// Stores a zone and drops its cached geometry.
    pub fn save_zone(&self, zone: &Zone) -> Result<()> {
        self.persistence.save_zone(zone)?;
        self.hulls.invalidate(&zone.id);
        Ok(())
    }

    pub fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        self.persistence
            .load_zone(zone_id)?
            .ok_or_else(|| SpectrumError::not_found("zone", zone_id))
    }

    pub fn list_zones(&self) -> Result<Vec<Zone>> {
        Ok(self.persistence.load_zones()?)
    }

    pub fn delete_zone(&self, zone_id: &str) -> Result<()> {
        self.hulls.invalidate(zone_id);
        if !self.persistence.delete_zone(zone_id)? {
            return Err(SpectrumError::not_found("zone", zone_id));
        }
        Ok(())
    }

    pub fn zone_contains(&self, zone_id: &str, identity: &str) -> Result<bool> {
        let zone = self.get_zone(zone_id)?;
        zones::contains(self, &zone, identity, Instant::now())
    }

    pub fn get_zone_members(&self, zone_id: &str) -> Result<Vec<ZoneMember>> {
        let zone = self.get_zone(zone_id)?;
        zones::members(self, &zone, Instant::now())
    }

    // Items

    pub fn add_item(&self, item: WorldItem) -> Result<()> {
        if !(item.claim_radius >= 0.0) {
            return Err(SpectrumError::InvalidArgument(format!(
                "item {} has claim radius {}",
                item.id, item.claim_radius
            )));
        }
        self.persistence.save_item(&item)?;
        Ok(())
    }

    pub fn items(&self) -> Result<Vec<WorldItem>> {
        Ok(self.persistence.items()?)
    }

    // Snapshots

    pub fn snapshot(&self) -> Result<SpectrumSnapshot> {
        build_snapshot(self)
    }
}

fn new_zone_id() -> String {
    format!("zone_{}", uuid::Uuid::new_v4().simple())
}
