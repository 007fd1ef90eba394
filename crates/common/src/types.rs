use serde::{Deserialize, Serialize};
use std::fmt;

/// 64-bit world region handle: grid-X in the upper 32 bits, grid-Y in the lower 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionHandle(pub u64);

impl RegionHandle {
    /// Pack grid coordinates into a handle.
    pub fn from_grid(x: i32, y: i32) -> Self {
        Self(((x as u32 as u64) << 32) | (y as u32 as u64))
    }

    /// Grid column X, sign-extended from the upper 32 bits.
    pub fn grid_x(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    /// Grid column Y, sign-extended from the lower 32 bits.
    pub fn grid_y(self) -> i32 {
        self.0 as u32 as i32
    }
}

impl From<u64> for RegionHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Opaque identifier of an object tracked by the occupancy registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_splits_into_grid_coords() {
        let h = RegionHandle(0x0000_000A_0000_000B);
        assert_eq!(h.grid_x(), 10);
        assert_eq!(h.grid_y(), 11);
    }

    #[test]
    fn handle_round_trips_negative_coords() {
        let h = RegionHandle::from_grid(-3, -70000);
        assert_eq!(h.grid_x(), -3);
        assert_eq!(h.grid_y(), -70000);
        assert_eq!(h.0 >> 32, 0xFFFF_FFFD);
    }

    #[test]
    fn object_id_display_is_raw_string() {
        let id = ObjectId::from("obj-1");
        assert_eq!(id.to_string(), "obj-1");
        assert_eq!(id, ObjectId::new(String::from("obj-1")));
    }
}
