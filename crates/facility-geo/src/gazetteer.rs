//! Geocoding against a fixed gazetteer.
//!
//! Lookups are case-insensitive exact matches after trimming. There is no
//! fuzzy or prefix matching: an unknown name is reported back verbatim so
//! the caller can retry with different input or explicit coordinates.

use std::collections::HashMap;

use crate::coord::{BoundingBox, Coordinates};
use crate::error::{GeoError, GeoResult};
use crate::parser::{parse_gazetteer, GazetteerRecord};

/// Major Ghanaian towns and cities.
const GHANA_CITIES: &[(&str, f64, f64)] = &[
    ("Accra", 5.6037, -0.1870),
    ("Kumasi", 6.6885, -1.6244),
    ("Tamale", 9.4008, -0.8393),
    ("Takoradi", 4.8845, -1.7554),
    ("Sekondi", 4.9340, -1.7137),
    ("Cape Coast", 5.1053, -1.2466),
    ("Sunyani", 7.3349, -2.3123),
    ("Ho", 6.6008, 0.4713),
    ("Koforidua", 6.0940, -0.2591),
    ("Bolgatanga", 10.7856, -0.8514),
    ("Wa", 10.0601, -2.5099),
    ("Techiman", 7.5860, -1.9381),
    ("Tema", 5.6698, -0.0166),
    ("Obuasi", 6.2024, -1.6700),
    ("Teshie", 5.5833, -0.1000),
    ("Madina", 5.6833, -0.1667),
    ("Ashaiman", 5.6947, -0.0297),
    ("Kasoa", 5.5340, -0.4168),
    ("Nkawkaw", 6.5500, -0.7667),
    ("Winneba", 5.3511, -0.6231),
    ("Hohoe", 7.1519, 0.4736),
    ("Keta", 5.9178, 0.9879),
    ("Aflao", 6.1167, 1.1833),
    ("Yendi", 9.4427, -0.0099),
    ("Salaga", 8.5500, -0.5167),
    ("Damongo", 9.0833, -1.8167),
    ("Dambai", 8.0667, 0.1833),
    ("Goaso", 6.8036, -2.5172),
    ("Sefwi Wiawso", 6.2058, -2.4894),
    ("Nalerigu", 10.5272, -0.3697),
    ("Bawku", 11.0608, -0.2417),
    ("Berekum", 7.4534, -2.5840),
    ("Ejisu", 6.7167, -1.4667),
    ("Konongo", 6.6167, -1.2167),
    ("Kintampo", 8.0563, -1.7306),
    ("Tarkwa", 5.3000, -1.9833),
];

/// Approximate extents of Ghana's sixteen administrative regions
/// as (name, south, west, north, east).
const GHANA_REGIONS: &[(&str, f64, f64, f64, f64)] = &[
    ("Greater Accra", 5.45, -0.55, 6.10, 0.70),
    ("Ashanti", 5.80, -2.60, 7.60, -0.50),
    ("Eastern", 5.70, -1.30, 7.20, 0.30),
    ("Central", 5.05, -2.20, 6.35, -0.40),
    ("Western", 4.70, -3.15, 6.30, -1.55),
    ("Western North", 5.70, -3.25, 7.00, -2.10),
    ("Volta", 5.75, 0.00, 7.35, 1.20),
    ("Oti", 7.30, -0.10, 8.90, 0.75),
    ("Bono", 7.00, -3.00, 8.30, -1.80),
    ("Bono East", 7.20, -2.00, 8.70, -0.30),
    ("Ahafo", 6.40, -2.80, 7.40, -2.00),
    ("Northern", 8.50, -2.00, 10.20, 0.60),
    ("Savannah", 8.00, -2.90, 10.00, -1.00),
    ("North East", 10.00, -0.90, 10.80, 0.50),
    ("Upper East", 10.30, -1.60, 11.20, 0.10),
    ("Upper West", 9.60, -2.95, 11.00, -1.40),
];

/// A named point in the gazetteer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceEntry {
    /// Name as originally written.
    pub name: String,
    /// Location of the place.
    pub location: Coordinates,
}

/// A named area in the gazetteer.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEntry {
    /// Name as originally written.
    pub name: String,
    /// Extent of the region.
    pub bounds: BoundingBox,
}

/// Fixed mapping from place and region names to locations.
///
/// # Example
///
/// ```rust
/// use facility_geo::{Gazetteer, GeoError};
///
/// let gazetteer = Gazetteer::ghana();
/// let kumasi = gazetteer.resolve("  KUMASI ").unwrap();
/// assert_eq!(kumasi.lat, 6.6885);
///
/// assert_eq!(
///     gazetteer.resolve("Atlantis"),
///     Err(GeoError::PlaceNotFound("Atlantis".to_string()))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: HashMap<String, PlaceEntry>,
    regions: HashMap<String, RegionEntry>,
}

impl Gazetteer {
    /// Creates an empty gazetteer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gazetteer with the built-in Ghana cities and regions.
    pub fn ghana() -> Self {
        let mut gazetteer = Self::new();
        for &(name, lat, lng) in GHANA_CITIES {
            gazetteer.places.insert(
                place_key(name),
                PlaceEntry {
                    name: name.to_string(),
                    location: Coordinates { lat, lng },
                },
            );
        }
        for &(name, south, west, north, east) in GHANA_REGIONS {
            gazetteer.regions.insert(
                region_key(name),
                RegionEntry {
                    name: name.to_string(),
                    bounds: BoundingBox {
                        south,
                        west,
                        north,
                        east,
                    },
                },
            );
        }
        gazetteer
    }

    /// Builds a gazetteer from text in the format accepted by
    /// [`parse_gazetteer`](crate::parse_gazetteer).
    pub fn parse(text: &str) -> GeoResult<Self> {
        let mut gazetteer = Self::new();
        gazetteer.extend_from_text(text)?;
        Ok(gazetteer)
    }

    /// Adds all records from gazetteer text, replacing same-named entries.
    ///
    /// Returns the number of records added. Nothing is added if any line fails.
    pub fn extend_from_text(&mut self, text: &str) -> GeoResult<usize> {
        let records = parse_gazetteer(text)?;
        let count = records.len();
        for record in records {
            match record {
                GazetteerRecord::City { name, location } => {
                    self.insert_place(name, location)?;
                }
                GazetteerRecord::Region { name, bounds } => {
                    self.insert_region(name, bounds)?;
                }
            }
        }
        Ok(count)
    }

    /// Adds or replaces a place.
    pub fn insert_place(
        &mut self,
        name: impl Into<String>,
        location: Coordinates,
    ) -> GeoResult<()> {
        let name = name.into();
        let key = place_key(&name);
        if key.is_empty() {
            return Err(GeoError::EmptyPlaceName);
        }
        let location = Coordinates::new(location.lat, location.lng)?;
        self.places.insert(
            key,
            PlaceEntry {
                name: name.trim().to_string(),
                location,
            },
        );
        Ok(())
    }

    /// Adds or replaces a region.
    pub fn insert_region(&mut self, name: impl Into<String>, bounds: BoundingBox) -> GeoResult<()> {
        let name = name.into();
        let key = region_key(&name);
        if key.is_empty() {
            return Err(GeoError::EmptyPlaceName);
        }
        let bounds = bounds.validated()?;
        self.regions.insert(
            key,
            RegionEntry {
                name: name.trim().to_string(),
                bounds,
            },
        );
        Ok(())
    }

    /// Resolves a place name to coordinates.
    ///
    /// # Errors
    ///
    /// [`GeoError::EmptyPlaceName`] for blank input, [`GeoError::PlaceNotFound`]
    /// carrying the trimmed name otherwise.
    pub fn resolve(&self, place_name: &str) -> GeoResult<Coordinates> {
        self.lookup_place(place_name).map(|entry| entry.location)
    }

    /// Resolves a place name to its full entry.
    pub fn lookup_place(&self, place_name: &str) -> GeoResult<&PlaceEntry> {
        let trimmed = place_name.trim();
        if trimmed.is_empty() {
            return Err(GeoError::EmptyPlaceName);
        }
        self.places
            .get(&place_key(trimmed))
            .ok_or_else(|| GeoError::PlaceNotFound(trimmed.to_string()))
    }

    /// Resolves a region name to its bounding box.
    ///
    /// A trailing "region" word is ignored, so "Ashanti Region" finds "Ashanti".
    pub fn resolve_region(&self, region_name: &str) -> GeoResult<BoundingBox> {
        let trimmed = region_name.trim();
        if trimmed.is_empty() {
            return Err(GeoError::EmptyPlaceName);
        }
        self.regions
            .get(&region_key(trimmed))
            .map(|entry| entry.bounds)
            .ok_or_else(|| GeoError::RegionNotFound(trimmed.to_string()))
    }

    /// Sorted place names.
    pub fn place_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.places.values().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Sorted region names.
    pub fn region_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.regions.values().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of places.
    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    /// Number of regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

fn place_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn region_key(name: &str) -> String {
    let key = place_key(name);
    match key.strip_suffix(" region") {
        Some(stripped) => stripped.trim_end().to_string(),
        None => key,
    }
}
