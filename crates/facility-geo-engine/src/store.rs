//! In-memory facility store.

use hashbrown::{HashMap, HashSet};
use tracing::warn;

use facility_geo::{Facility, FacilityId};

use crate::traits::{FacilityStore, SpatialPredicate};

/// Immutable, id-indexed facility collection held in memory.
///
/// Facilities are kept sorted by id so that scans are deterministic.
/// Duplicate ids keep the first record and drop the rest.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    facilities: Vec<Facility>,
    index: HashMap<FacilityId, usize>,
}

impl InMemoryStore {
    /// Builds a store from facility records.
    pub fn new(facilities: Vec<Facility>) -> Self {
        let mut seen: HashSet<FacilityId> = HashSet::with_capacity(facilities.len());
        let mut kept: Vec<Facility> = Vec::with_capacity(facilities.len());

        for facility in facilities {
            if !seen.insert(facility.id) {
                warn!(facility_id = facility.id, "duplicate facility id, record dropped");
                continue;
            }
            kept.push(facility);
        }

        kept.sort_by_key(|f| f.id);

        let invalid = kept
            .iter()
            .filter(|f| f.location.is_some() && f.spatial_location().is_none())
            .count();
        if invalid > 0 {
            warn!(
                count = invalid,
                "facilities with out-of-range coordinates excluded from spatial queries"
            );
        }

        let index = kept
            .iter()
            .enumerate()
            .map(|(pos, f)| (f.id, pos))
            .collect();

        Self {
            facilities: kept,
            index,
        }
    }

    /// All facilities in id order.
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// Number of facilities with a valid location.
    pub fn geocoded_count(&self) -> usize {
        self.facilities
            .iter()
            .filter(|f| f.spatial_location().is_some())
            .count()
    }
}

impl FromIterator<Facility> for InMemoryStore {
    fn from_iter<I: IntoIterator<Item = Facility>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FacilityStore for InMemoryStore {
    fn scan(&self, predicate: SpatialPredicate) -> Box<dyn Iterator<Item = &Facility> + '_> {
        Box::new(self.facilities.iter().filter(move |f| predicate.matches(f)))
    }

    fn get(&self, id: FacilityId) -> Option<&Facility> {
        self.index.get(&id).map(|&pos| &self.facilities[pos])
    }

    fn len(&self) -> usize {
        self.facilities.len()
    }
}
