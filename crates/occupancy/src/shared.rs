use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use subdiv_common::{ObjectId, RegionKey};

use crate::registry::OccupancyRegistry;

/// An [`OccupancyRegistry`] behind one coarse lock, for callers on several threads.
///
/// Each call locks once, so single mutations are atomic; sequences of calls
/// are not. Semantics match the unlocked registry.
#[derive(Debug, Clone, Default)]
pub struct SharedOccupancy {
    inner: Arc<Mutex<OccupancyRegistry>>,
}

impl SharedOccupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: OccupancyRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Lock the registry. A panic while locked cannot leave it half-updated,
    /// so a poisoned lock is taken over.
    pub fn lock(&self) -> MutexGuard<'_, OccupancyRegistry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the lock held, for multi-step updates that must not interleave.
    pub fn with<R>(&self, f: impl FnOnce(&mut OccupancyRegistry) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn add_object(&self, key: RegionKey, node: u64, object: impl Into<ObjectId>) {
        self.lock().add_object(key, node, object);
    }

    pub fn remove_object(&self, key: &RegionKey, node: u64, object: &str) -> bool {
        self.lock().remove_object(key, node, object)
    }

    pub fn update_object(
        &self,
        key: RegionKey,
        old_node: u64,
        new_node: u64,
        object: impl Into<ObjectId>,
    ) {
        self.lock().update_object(key, old_node, new_node, object);
    }

    pub fn num_objects(&self, key: &RegionKey, node: u64) -> usize {
        self.lock().num_objects(key, node)
    }

    pub fn objects(&self, key: &RegionKey, node: u64) -> Vec<ObjectId> {
        self.lock().objects(key, node)
    }

    pub fn has_any_nodes(&self, key: &RegionKey) -> bool {
        self.lock().has_any_nodes(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_registry() {
        let a = SharedOccupancy::new();
        let b = a.clone();
        let key = RegionKey::new(1, 2, 0);
        a.add_object(key, 5, "obj");
        assert_eq!(b.num_objects(&key, 5), 1);
        assert!(b.remove_object(&key, 5, "obj"));
        assert!(!a.has_any_nodes(&key));
    }

    #[test]
    fn concurrent_adds_are_all_kept() {
        let shared = SharedOccupancy::new();
        let key = RegionKey::new(0, 0, 0);
        std::thread::scope(|s| {
            for t in 0..4 {
                let shared = shared.clone();
                s.spawn(move || {
                    for i in 0..100 {
                        shared.add_object(key, 4 + (i % 4), format!("t{t}-{i}"));
                    }
                });
            }
        });
        assert_eq!(shared.lock().total_placements(), 400);
        assert_eq!(shared.num_objects(&key, 4), 100);
    }

    #[test]
    fn with_runs_under_one_lock() {
        let shared = SharedOccupancy::from_registry(OccupancyRegistry::new());
        let key = RegionKey::new(3, 3, 1);
        let moved = shared.with(|reg| {
            reg.add_object(key, 8, "obj");
            reg.update_object(key, 8, 9, "obj");
            reg.objects(&key, 9)
        });
        assert_eq!(moved, vec![ObjectId::from("obj")]);
        assert_eq!(shared.objects(&key, 8), Vec::<ObjectId>::new());
        shared.update_object(key, 9, 0, "obj");
        assert!(!shared.has_any_nodes(&key));
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let shared = SharedOccupancy::new();
        let key = RegionKey::new(0, 0, 0);
        shared.add_object(key, 2, "survivor");
        let clone = shared.clone();
        let result = std::thread::spawn(move || {
            let _guard = clone.lock();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());
        assert_eq!(shared.num_objects(&key, 2), 1);
    }
}
