//! Loading facility datasets and gazetteer extensions from disk.
//!
//! # Facility datasets
//!
//! A dataset is a JSON array of facility objects with camelCase fields:
//!
//! ```text
//! [
//!   {"id": 1, "name": "Ridge Hospital", "location": {"lat": 5.56, "lng": -0.197},
//!    "facilityType": "hospital", "specialties": ["Cardiology"], "capacity": 420}
//! ]
//! ```
//!
//! Records that do not decode as a facility are skipped with a warning; a
//! file that is not a JSON array at all is an error.
//!
//! # Gazetteer extensions
//!
//! Text in the `city | name | lat | lng` and
//! `region | name | south | west | north | east` line format, merged over a
//! base gazetteer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use facility_geo::{Facility, Gazetteer};
use facility_geo_engine::InMemoryStore;

use crate::error::{ServiceError, ServiceResult};

/// Reads a facility dataset file.
pub fn load_facilities<P: AsRef<Path>>(path: P) -> ServiceResult<InMemoryStore> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ServiceError::io_error(path, e))?;
    let records: Vec<Value> = serde_json::from_reader(BufReader::new(file))?;
    let store = build_store(records);
    info!(
        path = %path.display(),
        facilities = store.facilities().len(),
        "facility dataset loaded"
    );
    Ok(store)
}

/// Parses a facility dataset from a JSON string.
pub fn parse_facilities(json: &str) -> ServiceResult<InMemoryStore> {
    let records: Vec<Value> = serde_json::from_str(json)?;
    Ok(build_store(records))
}

fn build_store(records: Vec<Value>) -> InMemoryStore {
    let total = records.len();
    let facilities: Vec<Facility> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| match serde_json::from_value(record) {
            Ok(facility) => Some(facility),
            Err(err) => {
                warn!(position, error = %err, "malformed facility record skipped");
                None
            }
        })
        .collect();

    if facilities.len() < total {
        warn!(
            skipped = total - facilities.len(),
            total, "facility records skipped while loading"
        );
    }
    InMemoryStore::new(facilities)
}

/// Reads gazetteer text from a file and merges it over `base`.
///
/// Nothing is merged if any line fails to parse.
pub fn load_gazetteer_extension<P: AsRef<Path>>(
    path: P,
    mut base: Gazetteer,
) -> ServiceResult<Gazetteer> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ServiceError::io_error(path, e))?;
    let added = base.extend_from_text(&text)?;
    info!(path = %path.display(), records = added, "gazetteer extension loaded");
    Ok(base)
}
