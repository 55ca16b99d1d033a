//! Data-quality and anomaly scoring.
//!
//! Produces a completeness score over a fixed list of tracked fields and a
//! list of plausibility violations from a rule set. The scorer never rejects
//! a facility: any record, however sparse, yields a report.
//!
//! # Example
//!
//! ```rust
//! use facility_geo::Facility;
//! use facility_geo_engine::anomaly::AnomalyScorer;
//!
//! let scorer = AnomalyScorer::default();
//! let facility = Facility::new(7, "Eye clinic")
//!     .with_procedures(["Cataract surgery"])
//!     .with_phone("+233 30 000 0000");
//!
//! let report = scorer.score(&facility);
//! assert_eq!(report.completeness_score, 25);
//! assert_eq!(report.violations[0].rule, "equipment_mismatch");
//! ```

mod matcher;
mod rules;

pub use matcher::KeywordSet;
pub use rules::{default_rules, Claim, PlausibilityRule, Prerequisite};

use facility_geo::Facility;

use crate::result::{AnomalyReport, ViolationSeverity};

/// Version of the [`TRACKED_FIELDS`] list.
pub const TRACKED_FIELDS_VERSION: u32 = 1;

/// Fields counted towards completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    /// Number of doctors.
    NumDoctors,
    /// Bed capacity.
    Capacity,
    /// Specialty tags.
    Specialties,
    /// Procedure tags.
    Procedures,
    /// Equipment tags.
    Equipment,
    /// Contact email.
    Email,
    /// Contact phone.
    Phone,
    /// Website.
    Website,
}

/// Tracked fields, in reporting order.
pub const TRACKED_FIELDS: [TrackedField; 8] = [
    TrackedField::NumDoctors,
    TrackedField::Capacity,
    TrackedField::Specialties,
    TrackedField::Procedures,
    TrackedField::Equipment,
    TrackedField::Email,
    TrackedField::Phone,
    TrackedField::Website,
];

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl TrackedField {
    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedField::NumDoctors => "numDoctors",
            TrackedField::Capacity => "capacity",
            TrackedField::Specialties => "specialties",
            TrackedField::Procedures => "procedures",
            TrackedField::Equipment => "equipment",
            TrackedField::Email => "email",
            TrackedField::Phone => "phone",
            TrackedField::Website => "website",
        }
    }

    /// Returns true if the facility has a usable value for this field.
    pub fn is_present(&self, facility: &Facility) -> bool {
        match self {
            TrackedField::NumDoctors => facility.num_doctors.is_some(),
            TrackedField::Capacity => facility.capacity.is_some(),
            TrackedField::Specialties => !facility.specialties.is_empty(),
            TrackedField::Procedures => !facility.procedures.is_empty(),
            TrackedField::Equipment => !facility.equipment.is_empty(),
            TrackedField::Email => non_blank(&facility.email),
            TrackedField::Phone => non_blank(&facility.phone),
            TrackedField::Website => non_blank(&facility.website),
        }
    }
}

/// Confidence points removed per violation.
fn penalty(severity: ViolationSeverity) -> u32 {
    match severity {
        ViolationSeverity::High => 25,
        ViolationSeverity::Medium => 15,
        ViolationSeverity::Low => 5,
    }
}

/// Scores facilities against a rule set.
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    rules: Vec<PlausibilityRule>,
}

impl Default for AnomalyScorer {
    fn default() -> Self {
        Self::with_rules(default_rules())
    }
}

impl AnomalyScorer {
    /// Creates a scorer with the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scorer with exactly the given rules.
    pub fn with_rules(rules: Vec<PlausibilityRule>) -> Self {
        Self { rules }
    }

    /// Appends a rule.
    pub fn add_rule(&mut self, rule: PlausibilityRule) {
        self.rules.push(rule);
    }

    /// The active rules, in evaluation order.
    pub fn rules(&self) -> &[PlausibilityRule] {
        &self.rules
    }

    /// Percentage of tracked fields present, rounded.
    pub fn completeness(facility: &Facility) -> u8 {
        let present = TRACKED_FIELDS
            .iter()
            .filter(|field| field.is_present(facility))
            .count();
        ((present as f64 * 100.0) / TRACKED_FIELDS.len() as f64).round() as u8
    }

    /// Scores one facility.
    pub fn score(&self, facility: &Facility) -> AnomalyReport {
        let completeness_score = Self::completeness(facility);

        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.evaluate(facility))
            .collect();

        let total_penalty: u32 = violations.iter().map(|v| penalty(v.severity)).sum();
        let confidence_score = u32::from(completeness_score).saturating_sub(total_penalty) as u8;

        AnomalyReport {
            facility_id: facility.id,
            completeness_score,
            confidence_score,
            tracked_fields_version: TRACKED_FIELDS_VERSION,
            violations,
        }
    }
}
