//! World Setup
//!
//! Loads a world description (identities, headings, zones, items) from JSON
//! and installs it into a [`Spectrum`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::components::identity::IdentityRecord;
use crate::components::item::WorldItem;
use crate::components::point::{AxisSet, Point};
use crate::components::zone::Zone;
use crate::config::ItemConfig;
use crate::context::Spectrum;
use crate::error::SpectrumError;
use crate::persistence::MemoryDirectory;

/// Errors loading or installing a world file.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("world file parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not install world: {0}")]
    Spectrum(#[from] SpectrumError),
}

/// An item as written in a world file; omitted values come from `[items]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub location: Point,
    #[serde(default)]
    pub axes: AxisSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<i64>,
}

impl ItemDef {
    pub fn into_item(self, defaults: &ItemConfig) -> WorldItem {
        WorldItem::new(
            self.id,
            self.name,
            self.location,
            self.claim_radius.unwrap_or(defaults.default_claim_radius),
            self.reward.unwrap_or(defaults.default_reward),
        )
        .with_axes(self.axes)
    }
}

/// Contents of a world file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldFile {
    #[serde(default)]
    pub identities: Vec<IdentityRecord>,
    /// Identity -> raw heading
    #[serde(default)]
    pub headings: BTreeMap<String, String>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

/// Counts of what was installed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldSummary {
    pub identities: usize,
    pub headings: usize,
    pub zones: usize,
    pub items: usize,
}

impl WorldFile {
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(content)?)
    }

    /// A directory holding this world's identities.
    pub fn directory(&self) -> MemoryDirectory {
        MemoryDirectory::with_records(self.identities.iter().cloned())
    }

    /// Stores zones, items and headings. Identities come from the directory.
    pub fn populate(&self, ctx: &Spectrum) -> Result<WorldSummary, SetupError> {
        let mut summary = WorldSummary {
            identities: self.identities.len(),
            ..WorldSummary::default()
        };

        for zone in &self.zones {
            ctx.save_zone(zone)?;
            summary.zones += 1;
        }
        for def in &self.items {
            ctx.add_item(def.clone().into_item(&ctx.config().items))?;
            summary.items += 1;
        }
        for (identity, raw) in &self.headings {
            ctx.set_heading(identity, raw)?;
            summary.headings += 1;
        }

        tracing::info!(
            "Installed world: {} identities, {} headings, {} zones, {} items",
            summary.identities,
            summary.headings,
            summary.zones,
            summary.items
        );
        Ok(summary)
    }
}
