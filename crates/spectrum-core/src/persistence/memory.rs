//! In-memory collaborators.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use spectrum_events::HistoryEvent;

use super::{HistoryRecorder, IdentityDirectory, Persistence, StoreResult};
use crate::components::identity::IdentityRecord;
use crate::components::item::WorldItem;
use crate::components::point::Point;
use crate::components::zone::Zone;
use crate::error::PersistenceError;
use crate::octant::Octant;

/// A reward granted for claiming an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEntry {
    pub identity: String,
    pub item_id: String,
    pub amount: i64,
}

#[derive(Debug, Default)]
struct Tables {
    points: BTreeMap<String, (Point, Octant)>,
    headings: BTreeMap<String, String>,
    zones: BTreeMap<String, Zone>,
    items: BTreeMap<String, WorldItem>,
    rewards: Vec<RewardEntry>,
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    tables: Mutex<Tables>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewards recorded so far, in claim order.
    pub fn rewards(&self) -> Vec<RewardEntry> {
        self.tables().rewards.clone()
    }
}

impl Persistence for MemoryPersistence {
    fn load_point(&self, identity: &str) -> StoreResult<Option<Point>> {
        Ok(self.tables().points.get(identity).map(|(point, _)| *point))
    }

    fn save_point(&self, identity: &str, point: Point, octant: Octant) -> StoreResult<()> {
        self.tables()
            .points
            .insert(identity.to_string(), (point, octant));
        Ok(())
    }

    fn load_octant(&self, identity: &str) -> StoreResult<Option<Octant>> {
        Ok(self.tables().points.get(identity).map(|(_, octant)| *octant))
    }

    fn all_points(&self) -> StoreResult<BTreeMap<String, Point>> {
        Ok(self
            .tables()
            .points
            .iter()
            .map(|(identity, (point, _))| (identity.clone(), *point))
            .collect())
    }

    fn load_heading(&self, identity: &str) -> StoreResult<Option<String>> {
        Ok(self.tables().headings.get(identity).cloned())
    }

    fn save_heading(&self, identity: &str, heading: &str) -> StoreResult<()> {
        self.tables()
            .headings
            .insert(identity.to_string(), heading.to_string());
        Ok(())
    }

    fn clear_heading(&self, identity: &str) -> StoreResult<bool> {
        Ok(self.tables().headings.remove(identity).is_some())
    }

    fn all_headings(&self) -> StoreResult<BTreeMap<String, String>> {
        Ok(self.tables().headings.clone())
    }

    fn load_zones(&self) -> StoreResult<Vec<Zone>> {
        Ok(self.tables().zones.values().cloned().collect())
    }

    fn load_zone(&self, zone_id: &str) -> StoreResult<Option<Zone>> {
        Ok(self.tables().zones.get(zone_id).cloned())
    }

    fn save_zone(&self, zone: &Zone) -> StoreResult<()> {
        self.tables().zones.insert(zone.id.clone(), zone.clone());
        Ok(())
    }

    fn delete_zone(&self, zone_id: &str) -> StoreResult<bool> {
        Ok(self.tables().zones.remove(zone_id).is_some())
    }

    fn items(&self) -> StoreResult<Vec<WorldItem>> {
        Ok(self.tables().items.values().cloned().collect())
    }

    fn save_item(&self, item: &WorldItem) -> StoreResult<()> {
        self.tables().items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    fn claim_item(&self, item_id: &str, owner: &str, reward: i64) -> StoreResult<bool> {
        let mut tables = self.tables();
        let item = tables
            .items
            .get_mut(item_id)
            .ok_or_else(|| PersistenceError::WriteRejected {
                key: item_id.to_string(),
                reason: "no such item".to_string(),
            })?;
        if item.owner.is_some() {
            return Ok(false);
        }
        item.owner = Some(owner.to_string());
        tables.rewards.push(RewardEntry {
            identity: owner.to_string(),
            item_id: item_id.to_string(),
            amount: reward,
        });
        Ok(true)
    }
}

/// Fixed identity directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    records: Mutex<BTreeMap<String, IdentityRecord>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let directory = Self::new();
        for record in records {
            directory.register(record);
        }
        directory
    }

    /// Adds or replaces a record.
    pub fn register(&self, record: IdentityRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.identity.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityDirectory for MemoryDirectory {
    fn identities(&self) -> StoreResult<Vec<IdentityRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect())
    }

    fn lookup(&self, identity: &str) -> StoreResult<Option<IdentityRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .cloned())
    }
}

#[derive(Debug, Default)]
struct HistoryLog {
    events: Vec<HistoryEvent>,
    once_keys: BTreeSet<String>,
}

/// History kept in memory, honoring once keys.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    log: Mutex<HistoryLog>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HistoryEvent> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .clone()
    }

    pub fn len(&self) -> usize {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryRecorder for MemoryHistory {
    fn record(&self, event: &HistoryEvent) -> StoreResult<bool> {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = &event.once_key {
            if !log.once_keys.insert(key.clone()) {
                return Ok(false);
            }
        }
        log.events.push(event.clone());
        Ok(true)
    }
}
