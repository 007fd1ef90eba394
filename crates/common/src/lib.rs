//! Shared types for the subdivision LOD index.
//!
//! # Invariants
//! - A region key is a pure function of (region handle, z, slab height).
//! - Object identifiers are opaque; nothing here inspects their contents.

pub mod config;
pub mod region;
pub mod types;

pub use config::{ConfigError, LodConfig, MAX_LOCATE_DEPTH};
pub use region::{KeyParseError, RegionKey, SLAB_HEIGHT, derive_key, derive_key_with};
pub use types::{ObjectId, RegionHandle};

pub fn crate_info() -> &'static str {
    "subdiv-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
