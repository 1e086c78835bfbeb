//! In-flight registry for route sequencing
//!
//! At most one sequencing run per route at a time. The lock is released by
//! `RouteLockGuard` when it goes out of scope.

use std::collections::HashSet;
use std::sync::Arc;
use parking_lot::Mutex;
use uuid::Uuid;

/// RAII guard that releases the route when dropped.
pub struct RouteLockGuard {
    route_id: Uuid,
    registry: RouteLockRegistry,
}

#[cfg(test)]
impl RouteLockGuard {
    pub fn route_id(&self) -> Uuid {
        self.route_id
    }
}

impl Drop for RouteLockGuard {
    fn drop(&mut self) {
        self.registry.release(&self.route_id);
    }
}

/// Thread-safe set of routes currently being sequenced.
#[derive(Clone, Default)]
pub struct RouteLockRegistry {
    routes: Arc<Mutex<HashSet<Uuid>>>,
}

impl RouteLockRegistry {
    /// Claim a route. Returns `None` when another run holds it.
    pub fn try_acquire(&self, route_id: Uuid) -> Option<RouteLockGuard> {
        if !self.routes.lock().insert(route_id) {
            return None;
        }
        Some(RouteLockGuard {
            route_id,
            registry: self.clone(),
        })
    }

    #[cfg(test)]
    pub fn is_locked(&self, route_id: &Uuid) -> bool {
        self.routes.lock().contains(route_id)
    }

    fn release(&self, route_id: &Uuid) {
        self.routes.lock().remove(route_id);
    }
}
