//! Persistence Collaborators
//!
//! The narrow interfaces the core consumes for storage, identity lookup and
//! history. Implementations must be thread-safe; the in-memory ones in
//! [`memory`] back the CLI and the tests.

pub mod memory;

use std::collections::BTreeMap;

use spectrum_events::HistoryEvent;

use crate::components::identity::IdentityRecord;
use crate::components::item::WorldItem;
use crate::components::point::Point;
use crate::components::zone::Zone;
use crate::error::PersistenceError;
use crate::octant::Octant;

pub use memory::{MemoryDirectory, MemoryHistory, MemoryPersistence};

pub type StoreResult<T> = Result<T, PersistenceError>;

/// Durable storage for points, headings, zones and items.
pub trait Persistence: Send + Sync {
    fn load_point(&self, identity: &str) -> StoreResult<Option<Point>>;

    /// Stores a point together with its derived octant.
    fn save_point(&self, identity: &str, point: Point, octant: Octant) -> StoreResult<()>;

    fn load_octant(&self, identity: &str) -> StoreResult<Option<Octant>>;

    /// Every stored point, keyed by identity.
    fn all_points(&self) -> StoreResult<BTreeMap<String, Point>>;

    fn load_heading(&self, identity: &str) -> StoreResult<Option<String>>;

    fn save_heading(&self, identity: &str, heading: &str) -> StoreResult<()>;

    /// Removes a heading; returns whether one was stored.
    fn clear_heading(&self, identity: &str) -> StoreResult<bool>;

    fn all_headings(&self) -> StoreResult<BTreeMap<String, String>>;

    /// Every zone, ordered by id.
    fn load_zones(&self) -> StoreResult<Vec<Zone>>;

    fn load_zone(&self, zone_id: &str) -> StoreResult<Option<Zone>>;

    fn save_zone(&self, zone: &Zone) -> StoreResult<()>;

    /// Removes a zone; returns whether it existed.
    fn delete_zone(&self, zone_id: &str) -> StoreResult<bool>;

    /// Every item, ordered by id.
    fn items(&self) -> StoreResult<Vec<WorldItem>>;

    fn unclaimed_items(&self) -> StoreResult<Vec<WorldItem>> {
        Ok(self
            .items()?
            .into_iter()
            .filter(|item| !item.is_claimed())
            .collect())
    }

    fn save_item(&self, item: &WorldItem) -> StoreResult<()>;

    /// Sets the owner and books `reward` to them, only if the item is still
    /// unowned. Both happen in one write or neither does.
    ///
    /// Returns false when another identity got there first.
    fn claim_item(&self, item_id: &str, owner: &str, reward: i64) -> StoreResult<bool>;
}

/// Sink for history and canon records.
pub trait HistoryRecorder: Send + Sync {
    /// Records an event.
    ///
    /// Returns false, without recording, when the event carries a once key
    /// that has already been recorded.
    fn record(&self, event: &HistoryEvent) -> StoreResult<bool>;
}

/// The set of identities the simulation tracks.
pub trait IdentityDirectory: Send + Sync {
    fn identities(&self) -> StoreResult<Vec<IdentityRecord>>;

    fn lookup(&self, identity: &str) -> StoreResult<Option<IdentityRecord>> {
        Ok(self
            .identities()?
            .into_iter()
            .find(|record| record.identity == identity))
    }
}
