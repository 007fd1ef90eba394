use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::RegionHandle;

/// Height of one vertical slab in world units.
pub const SLAB_HEIGHT: f64 = 1024.0;

/// Identifies one (grid column, height slab) partition of the world.
///
/// Each key owns an independent subdivision tree. Displays as
/// `"gridX-gridY-slab"`, e.g. `"10-11-1"`; negative components keep their
/// sign, so `(-3, 7, -1)` prints as `"-3-7--1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionKey {
    pub grid_x: i32,
    pub grid_y: i32,
    pub slab: i64,
}

impl RegionKey {
    pub fn new(grid_x: i32, grid_y: i32, slab: i64) -> Self {
        Self {
            grid_x,
            grid_y,
            slab,
        }
    }

    /// Key for an already-split grid column and a world height.
    pub fn from_grid(grid_x: i32, grid_y: i32, z: f64) -> Self {
        Self::new(grid_x, grid_y, slab_of(z, SLAB_HEIGHT))
    }
}

/// Derive the region key for a region handle and world z, using [`SLAB_HEIGHT`].
pub fn derive_key(handle: impl Into<RegionHandle>, z: f64) -> RegionKey {
    derive_key_with(handle, z, SLAB_HEIGHT)
}

/// Like [`derive_key`] with an explicit slab height.
pub fn derive_key_with(handle: impl Into<RegionHandle>, z: f64, slab_height: f64) -> RegionKey {
    let handle = handle.into();
    RegionKey::new(handle.grid_x(), handle.grid_y(), slab_of(z, slab_height))
}

// `as` saturates, and NaN lands in slab 0.
fn slab_of(z: f64, slab_height: f64) -> i64 {
    (z / slab_height).floor() as i64
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.grid_x, self.grid_y, self.slab)
    }
}

/// Errors from parsing a `"gridX-gridY-slab"` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("region key {input:?}: expected a number for component {index}")]
    MissingComponent { input: String, index: usize },
    #[error("region key {input:?}: expected '-' after component {index}")]
    MissingSeparator { input: String, index: usize },
    #[error("region key {input:?}: component {index} out of range")]
    OutOfRange { input: String, index: usize },
    #[error("region key {input:?}: unexpected trailing text")]
    Trailing { input: String },
}

impl FromStr for RegionKey {
    type Err = KeyParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut rest = input;
        let mut parts = [0i64; 3];
        for (index, part) in parts.iter_mut().enumerate() {
            if index > 0 {
                rest = rest
                    .strip_prefix('-')
                    .ok_or_else(|| KeyParseError::MissingSeparator {
                        input: input.to_owned(),
                        index: index - 1,
                    })?;
            }
            let (value, tail) = take_int(rest).ok_or_else(|| KeyParseError::MissingComponent {
                input: input.to_owned(),
                index,
            })?;
            *part = value.map_err(|_| KeyParseError::OutOfRange {
                input: input.to_owned(),
                index,
            })?;
            rest = tail;
        }
        if !rest.is_empty() {
            return Err(KeyParseError::Trailing {
                input: input.to_owned(),
            });
        }

        let grid = |index: usize| {
            i32::try_from(parts[index]).map_err(|_| KeyParseError::OutOfRange {
                input: input.to_owned(),
                index,
            })
        };
        Ok(Self::new(grid(0)?, grid(1)?, parts[2]))
    }
}

/// Split an optionally negative decimal integer off the front of `s`.
fn take_int(s: &str) -> Option<(Result<i64, std::num::ParseIntError>, &str)> {
    let sign = usize::from(s.starts_with('-'));
    let digits = s[sign..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (number, tail) = s.split_at(sign + digits);
    Some((number.parse(), tail))
}
