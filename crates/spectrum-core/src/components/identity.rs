//! Identity Components
//!
//! Directory records and the weighting categories used by the generator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How far an identity's home server is from the simulation's home community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightCategory {
    /// The home community itself
    Local,
    /// Servers closely tied to home
    Neighbor,
    /// Known but unaffiliated servers
    Remote,
    /// Everything far away
    Distant,
}

impl WeightCategory {
    /// Multiplier applied to an axis's offset from 50.
    ///
    /// Below 1 pulls values toward the center, above 1 pushes them outward.
    pub fn multiplier(self) -> f64 {
        match self {
            WeightCategory::Local => 0.60,
            WeightCategory::Neighbor => 0.85,
            WeightCategory::Remote => 1.10,
            WeightCategory::Distant => 1.35,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeightCategory::Local => "local",
            WeightCategory::Neighbor => "neighbor",
            WeightCategory::Remote => "remote",
            WeightCategory::Distant => "distant",
        }
    }
}

impl fmt::Display for WeightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entry in the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<WeightCategory>,
    /// Server the identity lives on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl IdentityRecord {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: normalize_identity(&identity.into()).to_string(),
            category: None,
            origin: None,
        }
    }

    pub fn with_category(mut self, category: WeightCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Explicit category, else the category configured for this record's origin.
    pub fn resolved_category(
        &self,
        origins: &BTreeMap<String, WeightCategory>,
    ) -> Option<WeightCategory> {
        self.category.or_else(|| {
            self.origin
                .as_deref()
                .and_then(|origin| origins.get(&origin.to_lowercase()).copied())
        })
    }
}

/// Identity-style strings are handles such as `alice@spectrum.social`.
pub fn is_identity_style(raw: &str) -> bool {
    raw.contains('@')
}

/// Trims whitespace and a single leading `@`.
pub fn normalize_identity(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}
