//! Systems
//!
//! Per-tick passes: heading resolution, item claims, zone effects, and the
//! scheduler that runs them in order.

pub mod headings;
pub mod items;
pub mod tick;
pub mod zones;

pub use headings::{default_heading, resolve, EffectiveHeading};
pub use items::{claim_items, nearest_claimant, ClaimReport};
pub use tick::run_tick;
pub use zones::{apply_effects, contains, members, EffectReport, ZoneMember};
