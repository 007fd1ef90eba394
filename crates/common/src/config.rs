use serde::{Deserialize, Serialize};

use crate::region::SLAB_HEIGHT;

/// Deepest level point location will search. Deeper requests are clamped.
pub const MAX_LOCATE_DEPTH: u32 = 30;

/// Subdivision configuration: tree depth, root square size, slab height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Depth at which objects are placed in the occupancy registry.
    pub default_depth: u32,
    /// Side length of the root square of every region tree.
    pub extents: f32,
    /// Height of one vertical slab.
    pub slab_height: f64,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            default_depth: 11,
            extents: 256.0,
            slab_height: SLAB_HEIGHT,
        }
    }
}

/// Errors from validating a [`LodConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("extents must be positive and finite, got {0}")]
    InvalidExtents(f32),
    #[error("slab height must be positive and finite, got {0}")]
    InvalidSlabHeight(f64),
    #[error("default depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: u32, max: u32 },
}

impl LodConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.extents.is_finite() && self.extents > 0.0) {
            return Err(ConfigError::InvalidExtents(self.extents));
        }
        if !(self.slab_height.is_finite() && self.slab_height > 0.0) {
            return Err(ConfigError::InvalidSlabHeight(self.slab_height));
        }
        if self.default_depth > MAX_LOCATE_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                depth: self.default_depth,
                max: MAX_LOCATE_DEPTH,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lod_config_defaults() {
        let config = LodConfig::default();
        assert_eq!(config.default_depth, 11);
        assert_eq!(config.extents, 256.0);
        assert_eq!(config.slab_height, 1024.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = LodConfig {
            extents: 0.0,
            ..LodConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidExtents(0.0)));

        let config = LodConfig {
            slab_height: f64::NAN,
            ..LodConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSlabHeight(_))
        ));

        let config = LodConfig {
            default_depth: MAX_LOCATE_DEPTH + 1,
            ..LodConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DepthTooLarge { .. })
        ));
    }
}
