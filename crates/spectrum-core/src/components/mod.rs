//! Components
//!
//! Plain data types: points and axes, directory records, headings, zones and items.

pub mod heading;
pub mod identity;
pub mod item;
pub mod point;
pub mod zone;

pub use heading::{Heading, Sign};
pub use identity::{is_identity_style, normalize_identity, IdentityRecord, WeightCategory};
pub use item::WorldItem;
pub use point::{Axis, AxisSet, Point, AXIS_COUNT};
pub use zone::{Anchor, Zone, ZoneEffect, ZoneShape};
