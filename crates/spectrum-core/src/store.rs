//! Position Store
//!
//! Point reads and writes on top of [`Persistence`]: octant derivation,
//! Keeper protection, lazy generation and per-identity locking.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use crate::components::identity::WeightCategory;
use crate::components::point::Point;
use crate::error::{Result, SpectrumError};
use crate::generator::PositionGenerator;
use crate::octant::{classify, Octant};
use crate::persistence::Persistence;

/// Points for every identity, with the Keeper pinned at the origin.
pub struct PositionStore {
    keeper: String,
    generator: PositionGenerator,
    persistence: Arc<dyn Persistence>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PositionStore {
    pub fn new(keeper: impl Into<String>, persistence: Arc<dyn Persistence>) -> Self {
        let keeper = keeper.into();
        Self {
            generator: PositionGenerator::new(&keeper),
            keeper,
            persistence,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn keeper(&self) -> &str {
        &self.keeper
    }

    pub fn is_keeper(&self, identity: &str) -> bool {
        identity == self.keeper
    }

    pub fn generator(&self) -> &PositionGenerator {
        &self.generator
    }

    /// Writes the origin for the Keeper. The only write the Keeper accepts.
    pub fn seed_keeper(&self) -> Result<()> {
        self.persistence
            .save_point(&self.keeper, Point::ORIGIN, classify(&Point::ORIGIN))?;
        Ok(())
    }

    /// Stored point, or `NotFound`.
    pub fn get(&self, identity: &str) -> Result<Point> {
        self.try_get(identity)?
            .ok_or_else(|| SpectrumError::not_found("point", identity))
    }

    pub fn try_get(&self, identity: &str) -> Result<Option<Point>> {
        if self.is_keeper(identity) {
            return Ok(Some(Point::ORIGIN));
        }
        Ok(self.persistence.load_point(identity)?)
    }

    /// Persists a point and its octant. Rejects the Keeper.
    ///
    /// Callers doing read-modify-write must hold the identity lock.
    pub fn put(&self, identity: &str, point: Point) -> Result<Octant> {
        if self.is_keeper(identity) {
            return Err(SpectrumError::KeeperImmutable(identity.to_string()));
        }
        let point = Point::new(point.values());
        let octant = classify(&point);
        self.persistence.save_point(identity, point, octant)?;
        tracing::trace!(identity, %point, %octant, "point stored");
        Ok(octant)
    }

    /// Stored point, generating and storing one on first reference.
    pub fn ensure(&self, identity: &str, category: Option<WeightCategory>) -> Result<Point> {
        if self.is_keeper(identity) {
            return Ok(Point::ORIGIN);
        }
        self.with_identity_lock(identity, || {
            if let Some(point) = self.persistence.load_point(identity)? {
                return Ok(point);
            }
            let point = self.generator.generate(identity, category);
            self.put(identity, point)?;
            tracing::debug!(identity, %point, "generated initial point");
            Ok(point)
        })
    }

    /// Every stored point, plus the Keeper.
    pub fn all(&self) -> Result<BTreeMap<String, Point>> {
        let mut points = self.persistence.all_points()?;
        points.insert(self.keeper.clone(), Point::ORIGIN);
        Ok(points)
    }

    /// Runs `f` while holding this identity's lock.
    ///
    /// Not reentrant: `f` must not lock the same identity again. The lock
    /// is dropped from the table once nobody holds or waits on it.
    pub fn with_identity_lock<T>(&self, identity: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(identity.to_string()).or_default())
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table, one here: no other caller has it.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(identity);
        }
        result
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
