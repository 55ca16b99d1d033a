//! Atomically swappable facility data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::info;

use facility_geo::Gazetteer;
use facility_geo_engine::InMemoryStore;

/// One immutable version of the facility data and gazetteer.
#[derive(Debug)]
pub struct FacilitySnapshot {
    /// Facility records.
    pub store: InMemoryStore,
    /// Place and region lookup.
    pub gazetteer: Gazetteer,
    /// Monotonic version number, starting at 1.
    pub generation: u64,
    /// When this version was installed.
    pub loaded_at: DateTime<Utc>,
}

/// Holds the current snapshot and swaps it atomically.
///
/// Readers take an `Arc` once per operation, so an analysis always sees one
/// consistent version even while a replacement is installed.
///
/// # Example
///
/// ```rust
/// use facility_geo::{Facility, Gazetteer};
/// use facility_geo_engine::InMemoryStore;
/// use facility_geo_service::SnapshotStore;
///
/// let snapshots = SnapshotStore::new(InMemoryStore::default(), Gazetteer::ghana());
/// let before = snapshots.current();
///
/// snapshots.replace(InMemoryStore::new(vec![Facility::new(1, "Ridge")]), Gazetteer::ghana());
/// assert_eq!(before.generation, 1);
/// assert_eq!(snapshots.current().generation, 2);
/// assert_eq!(before.store.facilities().len(), 0);
/// ```
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<FacilitySnapshot>>,
}

impl SnapshotStore {
    /// Creates a store holding generation 1.
    pub fn new(store: InMemoryStore, gazetteer: Gazetteer) -> Self {
        Self {
            current: RwLock::new(Arc::new(FacilitySnapshot {
                store,
                gazetteer,
                generation: 1,
                loaded_at: Utc::now(),
            })),
        }
    }

    /// Returns the current snapshot.
    pub fn current(&self) -> Arc<FacilitySnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Current generation number.
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Installs new data and returns its generation.
    pub fn replace(&self, store: InMemoryStore, gazetteer: Gazetteer) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation + 1;
        let facilities = store.facilities().len();
        *current = Arc::new(FacilitySnapshot {
            store,
            gazetteer,
            generation,
            loaded_at: Utc::now(),
        });
        info!(generation, facilities, "facility snapshot replaced");
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facility_geo::Facility;

    #[test]
    fn test_initial_generation() {
        let snapshots = SnapshotStore::new(InMemoryStore::default(), Gazetteer::new());
        assert_eq!(snapshots.generation(), 1);
        assert!(snapshots.current().loaded_at <= Utc::now());
    }

    #[test]
    fn test_replace_bumps_generation() {
        let snapshots = SnapshotStore::new(InMemoryStore::default(), Gazetteer::new());
        assert_eq!(
            snapshots.replace(InMemoryStore::default(), Gazetteer::new()),
            2
        );
        assert_eq!(
            snapshots.replace(InMemoryStore::default(), Gazetteer::new()),
            3
        );
        assert_eq!(snapshots.generation(), 3);
    }

    #[test]
    fn test_readers_keep_their_version() {
        let snapshots = SnapshotStore::new(
            InMemoryStore::new(vec![Facility::new(1, "Ridge")]),
            Gazetteer::ghana(),
        );
        let pinned = snapshots.current();
        snapshots.replace(InMemoryStore::default(), Gazetteer::new());

        assert_eq!(pinned.store.facilities().len(), 1);
        assert!(pinned.gazetteer.place_count() > 0);
        assert_eq!(snapshots.current().store.facilities().len(), 0);
    }
}
