use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use subdiv_cbt::NodeId;
use subdiv_common::{ConfigError, LodConfig, ObjectId, RegionHandle, RegionKey, derive_key_with};
use subdiv_leb::{Neighbors, Triangle, decode, footprint_radius, locate, neighbors};

use crate::registry::OccupancyRegistry;

/// Where an object sits: its region key and its node at the configured depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub key: RegionKey,
    /// 0 when the position lies outside the region's root square.
    pub node: u64,
}

/// Subdivision tree of one region key. Holds no nodes, only the parameters
/// needed to turn ids into geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionTree {
    pub key: RegionKey,
    pub depth: u32,
    pub extents: f32,
}

impl RegionTree {
    pub fn locate(&self, x: f32, y: f32) -> u64 {
        locate(x, y, self.depth, self.extents)
    }

    pub fn decode(&self, node: u64) -> Triangle {
        decode(node, subdiv_cbt::depth_of(node), self.extents)
    }

    pub fn footprint_radius(&self, node: u64) -> f32 {
        footprint_radius(node, subdiv_cbt::depth_of(node), self.extents)
    }

    pub fn neighbors(&self, node: u64) -> Neighbors {
        neighbors(node)
    }
}

/// The subdivision LOD index for one world: region trees plus object occupancy.
///
/// Owned by the simulation context and passed to whoever needs it; there is no
/// global instance.
#[derive(Debug, Clone)]
pub struct SubdivisionLod {
    config: LodConfig,
    regions: BTreeSet<RegionKey>,
    occupancy: OccupancyRegistry,
}

impl Default for SubdivisionLod {
    fn default() -> Self {
        Self {
            config: LodConfig::default(),
            regions: BTreeSet::new(),
            occupancy: OccupancyRegistry::new(),
        }
    }
}

impl SubdivisionLod {
    pub fn new(config: LodConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    pub fn occupancy(&self) -> &OccupancyRegistry {
        &self.occupancy
    }

    pub fn occupancy_mut(&mut self) -> &mut OccupancyRegistry {
        &mut self.occupancy
    }

    /// Region key for a handle and world height under this config's slab height.
    pub fn key_for(&self, handle: RegionHandle, z: f64) -> RegionKey {
        derive_key_with(handle, z, self.config.slab_height)
    }

    /// Tree for the region containing `(handle, z)`, registering it on first use.
    pub fn region_tree(&mut self, handle: RegionHandle, z: f64) -> RegionTree {
        let key = self.key_for(handle, z);
        self.register(key);
        self.tree(key)
    }

    /// Region keys that have been asked for so far.
    pub fn registered_regions(&self) -> impl Iterator<Item = &RegionKey> {
        self.regions.iter()
    }

    /// Region key and node for a position, at the configured depth.
    pub fn place(&self, handle: RegionHandle, position: Vec3) -> Placement {
        let key = self.key_for(handle, f64::from(position.z));
        let node = self.tree(key).locate(position.x, position.y);
        Placement { key, node }
    }

    /// Keep the registry in step with one object's movement.
    ///
    /// `old` is `None` for an object entering the world and `new` is `None`
    /// for one leaving it. Moves inside one region key become a single update;
    /// moves across keys remove from the old key and add to the new one.
    /// Returns the new placement, or `None` when the object left or landed
    /// outside every node.
    pub fn track_object(
        &mut self,
        handle: RegionHandle,
        old: Option<Vec3>,
        new: Option<Vec3>,
        object: impl Into<ObjectId>,
    ) -> Option<Placement> {
        let object = object.into();
        let _span = tracing::info_span!("track_object", %object).entered();

        let from = old.map(|p| self.place(handle, p));
        let to = new.map(|p| self.place(handle, p));
        if let Some(to) = to.filter(|p| p.node != 0) {
            self.register(to.key);
        }

        match (from, to) {
            (Some(from), Some(to)) if from == to => {
                tracing::trace!(key = %to.key, node = to.node, "object stayed in its node");
            }
            (Some(from), Some(to)) if from.key == to.key => {
                self.occupancy
                    .update_object(to.key, from.node, to.node, object);
            }
            (from, to) => {
                if let Some(from) = from {
                    self.occupancy
                        .remove_object(&from.key, from.node, object.as_str());
                }
                if let Some(to) = to {
                    self.occupancy.add_object(to.key, to.node, object);
                }
            }
        }

        to.filter(|p| p.node != 0)
    }

    /// Objects in the node containing `position`.
    pub fn objects_at(&self, handle: RegionHandle, position: Vec3) -> Vec<ObjectId> {
        let placement = self.place(handle, position);
        self.occupancy.objects(&placement.key, placement.node)
    }

    /// Objects in the node containing `position` and in its neighbors.
    pub fn objects_near(&self, handle: RegionHandle, position: Vec3) -> Vec<ObjectId> {
        let placement = self.place(handle, position);
        self.occupancy
            .objects_near(&placement.key, placement.node)
    }

    /// Objects anywhere inside the coarser node at `depth` that contains
    /// `position`. Empty when `depth` is deeper than the configured depth.
    pub fn objects_within(&self, handle: RegionHandle, position: Vec3, depth: u32) -> Vec<ObjectId> {
        let placement = self.place(handle, position);
        NodeId::new(placement.node)
            .ok()
            .and_then(|node| node.ancestor_at_depth(depth))
            .map(|ancestor| self.occupancy.objects_within(&placement.key, ancestor.get()))
            .unwrap_or_default()
    }

    /// Whether the region containing `(handle, z)` has any occupied node.
    pub fn has_any_nodes(&self, handle: RegionHandle, z: f64) -> bool {
        self.occupancy.has_any_nodes(&self.key_for(handle, z))
    }

    fn tree(&self, key: RegionKey) -> RegionTree {
        RegionTree {
            key,
            depth: self.config.default_depth,
            extents: self.config.extents,
        }
    }

    fn register(&mut self, key: RegionKey) {
        if self.regions.insert(key) {
            tracing::debug!(%key, "registered region tree");
        }
    }
}
