use std::collections::{BTreeMap, HashMap};

use subdiv_cbt::NodeId;
use subdiv_common::{ObjectId, RegionKey};
use subdiv_leb::neighbors;

/// Maps (region key, node id) to the objects occupying that node.
///
/// Lists keep insertion order and may hold the same object more than once;
/// callers wanting exactly-one placement must not insert twice. Node id 0 is
/// the "no node" sentinel and is never stored. Lists that become empty are
/// erased, as are keys with no remaining lists, so a missing entry and an
/// emptied one look the same to every query.
#[derive(Debug, Clone, Default)]
pub struct OccupancyRegistry {
    regions: HashMap<RegionKey, BTreeMap<u64, Vec<ObjectId>>>,
}

impl OccupancyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `object` to the list at `(key, node)`. Node 0 is ignored.
    pub fn add_object(&mut self, key: RegionKey, node: u64, object: impl Into<ObjectId>) {
        if node == 0 {
            return;
        }
        let object = object.into();
        tracing::debug!(%key, node, %object, "add object");
        self.regions
            .entry(key)
            .or_default()
            .entry(node)
            .or_default()
            .push(object);
    }

    /// Remove one instance of `object` from `(key, node)`.
    /// Returns false, and changes nothing, if it was not there.
    pub fn remove_object(&mut self, key: &RegionKey, node: u64, object: &str) -> bool {
        let Some(nodes) = self.regions.get_mut(key) else {
            return false;
        };
        let Some(list) = nodes.get_mut(&node) else {
            return false;
        };
        let Some(index) = list.iter().position(|o| o.as_str() == object) else {
            return false;
        };
        list.remove(index);
        tracing::debug!(%key, node, object, "remove object");

        if list.is_empty() {
            nodes.remove(&node);
            if nodes.is_empty() {
                self.regions.remove(key);
            }
        }
        true
    }

    /// Move `object` from `old_node` to `new_node` within `key`.
    ///
    /// A 0 on either side skips that side: `old_node = 0` only inserts,
    /// `new_node = 0` only removes.
    pub fn update_object(
        &mut self,
        key: RegionKey,
        old_node: u64,
        new_node: u64,
        object: impl Into<ObjectId>,
    ) {
        let object = object.into();
        if old_node != 0 {
            self.remove_object(&key, old_node, object.as_str());
        }
        if new_node != 0 {
            self.add_object(key, new_node, object);
        }
    }

    pub fn num_objects(&self, key: &RegionKey, node: u64) -> usize {
        self.list(key, node).map_or(0, <[ObjectId]>::len)
    }

    /// Snapshot of the objects at `(key, node)`, in insertion order.
    pub fn objects(&self, key: &RegionKey, node: u64) -> Vec<ObjectId> {
        self.list(key, node).map(<[ObjectId]>::to_vec).unwrap_or_default()
    }

    /// Whether any node under `key` holds at least one object.
    pub fn has_any_nodes(&self, key: &RegionKey) -> bool {
        self.regions.contains_key(key)
    }

    /// Occupied node ids under `key`, ascending.
    pub fn nodes(&self, key: &RegionKey) -> Vec<u64> {
        self.regions
            .get(key)
            .map(|nodes| nodes.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Objects at `node` followed by those at its same-depth neighbors.
    pub fn objects_near(&self, key: &RegionKey, node: u64) -> Vec<ObjectId> {
        if node == 0 {
            return Vec::new();
        }
        let mut result = self.objects(key, node);
        for other in neighbors(node).iter() {
            if let Some(list) = self.list(key, other) {
                result.extend_from_slice(list);
            }
        }
        result
    }

    /// Objects at `ancestor` and at every occupied node below it, in node order.
    pub fn objects_within(&self, key: &RegionKey, ancestor: u64) -> Vec<ObjectId> {
        let Ok(ancestor) = NodeId::new(ancestor) else {
            return Vec::new();
        };
        self.regions
            .get(key)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter(|&(&node, _)| NodeId::new(node).is_ok_and(|n| ancestor.is_ancestor_of(n)))
                    .flat_map(|(_, list)| list.iter().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Region keys with at least one occupied node.
    pub fn keys(&self) -> impl Iterator<Item = &RegionKey> {
        self.regions.keys()
    }

    /// Number of region keys with at least one occupied node.
    pub fn key_count(&self) -> usize {
        self.regions.len()
    }

    /// Total number of object placements across all keys and nodes.
    pub fn total_placements(&self) -> usize {
        self.regions
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    fn list(&self, key: &RegionKey, node: u64) -> Option<&[ObjectId]> {
        self.regions
            .get(key)
            .and_then(|nodes| nodes.get(&node))
            .map(Vec::as_slice)
    }
}
