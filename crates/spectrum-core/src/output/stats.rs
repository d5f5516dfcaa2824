//! Statistics Output
//!
//! Accumulates per-tick counters into run-level statistics for analysis.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use spectrum_events::{SpectrumSnapshot, TickStats};

/// Overall run statistics
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub total_ticks: u64,
    pub total_moved: usize,
    pub total_affixed: usize,
    pub total_drifted: usize,
    pub total_failed: usize,
    pub items_awarded: usize,
    pub zone_effects_applied: usize,
    pub zone_effects_failed: usize,
    pub average_moved_per_tick: f64,
    /// Octant label -> identities, at the end of the run
    pub final_octants: BTreeMap<String, usize>,
    pub tick_history: Vec<TickSummary>,
}

/// Summary of a tick for history
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub moved: usize,
    pub failures: usize,
}

/// Accumulates statistics while the simulation runs
#[derive(Debug, Default)]
pub struct StatsCollector {
    totals: TickStats,
    ticks: u64,
    tick_history: Vec<TickSummary>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick's counters
    pub fn record_tick(&mut self, stats: &TickStats) {
        self.ticks += 1;
        self.totals.identities = stats.identities;
        self.totals.moved += stats.moved;
        self.totals.affixed += stats.affixed;
        self.totals.drifted += stats.drifted;
        self.totals.failed += stats.failed;
        self.totals.items_awarded += stats.items_awarded;
        self.totals.zone_effects_applied += stats.zone_effects_applied;
        self.totals.zone_effects_failed += stats.zone_effects_failed;

        self.tick_history.push(TickSummary {
            tick: stats.tick,
            moved: stats.moved,
            failures: stats.total_failures(),
        });
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Generate final statistics
    pub fn generate_stats(&self, snapshot: Option<&SpectrumSnapshot>) -> SimulationStats {
        let average_moved_per_tick = if self.ticks > 0 {
            self.totals.moved as f64 / self.ticks as f64
        } else {
            0.0
        };

        SimulationStats {
            total_ticks: self.ticks,
            total_moved: self.totals.moved,
            total_affixed: self.totals.affixed,
            total_drifted: self.totals.drifted,
            total_failed: self.totals.failed,
            items_awarded: self.totals.items_awarded,
            zone_effects_applied: self.totals.zone_effects_applied,
            zone_effects_failed: self.totals.zone_effects_failed,
            average_moved_per_tick,
            final_octants: snapshot.map(SpectrumSnapshot::octant_counts).unwrap_or_default(),
            tick_history: self.tick_history.clone(),
        }
    }
}

/// Write statistics as pretty JSON, creating parent directories.
pub fn write_stats(stats: &SimulationStats, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)
}
