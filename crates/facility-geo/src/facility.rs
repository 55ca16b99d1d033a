//! Facility records.

use std::collections::BTreeSet;

use crate::coord::Coordinates;
use crate::FacilityId;

/// Kind of healthcare facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FacilityType {
    /// Hospital with inpatient beds.
    Hospital,
    /// Outpatient clinic or health centre.
    Clinic,
    /// Pharmacy or chemical seller.
    Pharmacy,
    /// Anything else, including unrecognised labels.
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Other,
}

impl FacilityType {
    /// Maps a free-text label onto a facility type, falling back to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "hospital" => FacilityType::Hospital,
            "clinic" => FacilityType::Clinic,
            "pharmacy" => FacilityType::Pharmacy,
            _ => FacilityType::Other,
        }
    }

    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityType::Hospital => "hospital",
            FacilityType::Clinic => "clinic",
            FacilityType::Pharmacy => "pharmacy",
            FacilityType::Other => "other",
        }
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A healthcare facility record.
///
/// Records are web-extracted and unverified: any field may be missing, and a
/// missing number means "unknown", never zero. Tag sets are ordered so that
/// iteration and serialization are deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Facility {
    /// Stable unique identifier.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Known coordinates, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Coordinates>,
    /// Administrative region label.
    #[cfg_attr(feature = "serde", serde(default))]
    pub region: Option<String>,
    /// City or town label.
    #[cfg_attr(feature = "serde", serde(default))]
    pub city: Option<String>,
    /// Street address.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: Option<String>,
    /// Facility kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub facility_type: FacilityType,
    /// Specialty tags, stored as provided (case-sensitive).
    #[cfg_attr(feature = "serde", serde(default))]
    pub specialties: BTreeSet<String>,
    /// Procedure tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub procedures: BTreeSet<String>,
    /// Equipment tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipment: BTreeSet<String>,
    /// Number of doctors, if reported.
    #[cfg_attr(feature = "serde", serde(default))]
    pub num_doctors: Option<u32>,
    /// Bed count, if reported.
    #[cfg_attr(feature = "serde", serde(default))]
    pub capacity: Option<u32>,
    /// Contact email.
    #[cfg_attr(feature = "serde", serde(default))]
    pub email: Option<String>,
    /// Contact phone number.
    #[cfg_attr(feature = "serde", serde(default))]
    pub phone: Option<String>,
    /// Website URL.
    #[cfg_attr(feature = "serde", serde(default))]
    pub website: Option<String>,
}

impl Facility {
    /// Creates a facility with only an id and a name.
    pub fn new(id: FacilityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the location without validating it.
    ///
    /// Out-of-range coordinates are kept as-is and simply make the facility
    /// invisible to spatial queries.
    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(Coordinates { lat, lng });
        self
    }

    /// Sets the facility type.
    pub fn with_type(mut self, facility_type: FacilityType) -> Self {
        self.facility_type = facility_type;
        self
    }

    /// Sets the region label.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the city label.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Adds specialty tags.
    pub fn with_specialties<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_tags(&mut self.specialties, tags);
        self
    }

    /// Adds procedure tags.
    pub fn with_procedures<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_tags(&mut self.procedures, tags);
        self
    }

    /// Adds equipment tags.
    pub fn with_equipment<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_tags(&mut self.equipment, tags);
        self
    }

    /// Sets the number of doctors.
    pub fn with_num_doctors(mut self, num_doctors: u32) -> Self {
        self.num_doctors = Some(num_doctors);
        self
    }

    /// Sets the bed count.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the contact phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the website.
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Location usable for spatial queries.
    ///
    /// Returns `None` when the location is absent or invalid; such
    /// facilities are excluded from every spatial operation.
    pub fn spatial_location(&self) -> Option<Coordinates> {
        self.location.filter(Coordinates::is_valid)
    }

    /// Exact, case-sensitive specialty membership.
    pub fn has_specialty(&self, specialty: &str) -> bool {
        self.specialties.contains(specialty)
    }
}

fn extend_tags<I, S>(set: &mut BTreeSet<String>, tags: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for tag in tags {
        let tag: String = tag.into();
        let trimmed = tag.trim();
        if !trimmed.is_empty() {
            set.insert(trimmed.to_string());
        }
    }
}
