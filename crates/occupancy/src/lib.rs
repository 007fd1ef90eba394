//! Occupancy: which objects sit in which subdivision node of which region.
//!
//! # Invariants
//! - The registry owns only object identifiers, never the objects.
//! - Queries on a missing (key, node) pair behave exactly like an emptied one.
//! - All access to one registry is serialized, by `&mut` or by
//!   [`SharedOccupancy`]'s lock.

mod lod;
mod registry;
mod shared;

pub use lod::{Placement, RegionTree, SubdivisionLod};
pub use registry::OccupancyRegistry;
pub use shared::SharedOccupancy;

pub fn crate_info() -> &'static str {
    "subdiv-occupancy v0.1.0"
}
