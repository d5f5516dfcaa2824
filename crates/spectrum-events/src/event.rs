//! History Events
//!
//! Canon/history records emitted by the simulation core and consumed by
//! whatever records the world's history (a JSONL log, a database table).

use serde::{Deserialize, Serialize};

/// Category of a history record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    /// A zone's canon effect fired for a member
    Canon,
    /// An identity claimed a world item
    ItemClaimed,
    /// An identity was reset to its generated position
    Reset,
    /// A zone overwrote an identity's heading
    HeadingOverride,
}

impl HistoryKind {
    /// Returns all history kinds.
    pub fn all() -> &'static [HistoryKind] {
        &[
            HistoryKind::Canon,
            HistoryKind::ItemClaimed,
            HistoryKind::Reset,
            HistoryKind::HeadingOverride,
        ]
    }

    /// Snake-case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Canon => "canon",
            HistoryKind::ItemClaimed => "item_claimed",
            HistoryKind::Reset => "reset",
            HistoryKind::HeadingOverride => "heading_override",
        }
    }
}

/// A single history record.
///
/// Records carrying a `once_key` are idempotent: a recorder accepts the
/// first record with a given key and ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event_id: String,
    pub tick: u64,
    pub kind: HistoryKind,
    /// The identity the event happened to
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub once_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<i64>,
}

impl HistoryEvent {
    /// Serializes the event to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an event from a JSONL line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Checks whether the event concerns the given identity.
    pub fn involves(&self, identity: &str) -> bool {
        self.identity == identity
    }

    /// True when the event must be recorded at most once.
    pub fn is_once(&self) -> bool {
        self.once_key.is_some()
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

/// Builder for history events.
#[derive(Debug, Clone)]
pub struct HistoryEventBuilder {
    event: HistoryEvent,
}

impl HistoryEventBuilder {
    /// Starts a new event of the given kind about an identity.
    pub fn new(kind: HistoryKind, identity: impl Into<String>) -> Self {
        Self {
            event: HistoryEvent {
                event_id: String::new(),
                tick: 0,
                kind,
                identity: identity.into(),
                zone_id: None,
                item_id: None,
                title: String::new(),
                description: None,
                once_key: None,
                reward: None,
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.event.event_id = id.into();
        self
    }

    pub fn tick(mut self, tick: u64) -> Self {
        self.event.tick = tick;
        self
    }

    pub fn zone(mut self, zone_id: impl Into<String>) -> Self {
        self.event.zone_id = Some(zone_id.into());
        self
    }

    pub fn item(mut self, item_id: impl Into<String>) -> Self {
        self.event.item_id = Some(item_id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.event.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.event.description = Some(description.into());
        self
    }

    /// Marks the event as fire-once under the given key.
    pub fn once_key(mut self, key: impl Into<String>) -> Self {
        self.event.once_key = Some(key.into());
        self
    }

    pub fn reward(mut self, amount: i64) -> Self {
        self.event.reward = Some(amount);
        self
    }

    /// Finishes the event. A missing title falls back to the kind name.
    pub fn build(mut self) -> HistoryEvent {
        if self.event.title.is_empty() {
            self.event.title = self.event.kind.as_str().to_string();
        }
        self.event
    }
}
