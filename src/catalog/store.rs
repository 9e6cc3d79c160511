//! CatalogStore - publishes catalog snapshots by reference swap.
//!
//! Readers take an `Arc<CatalogSnapshot>` and compile against it for the
//! whole request; a concurrent reload swaps the pointer and never touches a
//! snapshot somebody is still holding.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use super::snapshot::CatalogSnapshot;

/// Holder of the current catalog snapshot.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot to use for one request. The lock is held only for the
    /// `Arc` clone.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn publish(&self, snapshot: CatalogSnapshot) -> Arc<CatalogSnapshot> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, Arc::clone(&next));
        drop(guard);

        tracing::info!(
            version = %next.version,
            hash = %next.hash,
            content_changed = !previous.same_content(&next),
            "published catalog snapshot"
        );
        previous
    }

    /// Load a catalog file and publish it. On failure the current snapshot
    /// stays in place.
    pub fn reload_from(&self, path: &Path) -> anyhow::Result<Arc<CatalogSnapshot>> {
        match CatalogSnapshot::load_yaml(path) {
            Ok(snapshot) => {
                self.publish(snapshot);
                Ok(self.snapshot())
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "catalog reload failed, keeping current snapshot"
                );
                Err(e)
            }
        }
    }

    /// Hash of the current snapshot.
    pub fn current_hash(&self) -> String {
        self.snapshot().hash.clone()
    }
}
