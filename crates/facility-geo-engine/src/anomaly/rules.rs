//! Plausibility rules.
//!
//! A rule pairs a claim (something the facility says it offers) with the
//! prerequisites that claim needs. Rules are plain values: the scorer folds
//! over whatever list it is given.

use facility_geo::{Facility, FacilityType};

use super::matcher::KeywordSet;
use crate::result::{Violation, ViolationSeverity};

/// What a facility must claim for a rule to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// A procedure tag matches.
    Procedure(KeywordSet),
    /// A specialty tag matches.
    Specialty(KeywordSet),
    /// A specialty or procedure tag matches.
    SpecialtyOrProcedure(KeywordSet),
    /// The facility is of the given type.
    FacilityType(FacilityType),
    /// Both doctor count and capacity are reported.
    StaffAndCapacityReported,
}

impl Claim {
    /// Returns true if the facility makes this claim.
    pub fn is_made_by(&self, facility: &Facility) -> bool {
        match self {
            Claim::Procedure(keywords) => keywords.matches_any(&facility.procedures),
            Claim::Specialty(keywords) => keywords.matches_any(&facility.specialties),
            Claim::SpecialtyOrProcedure(keywords) => {
                keywords.matches_any(&facility.specialties)
                    || keywords.matches_any(&facility.procedures)
            }
            Claim::FacilityType(facility_type) => facility.facility_type == *facility_type,
            Claim::StaffAndCapacityReported => {
                facility.num_doctors.is_some() && facility.capacity.is_some()
            }
        }
    }
}

/// Something a claim needs in order to be plausible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    /// An equipment tag must match.
    Equipment {
        /// Name of the equipment, used in explanations.
        description: String,
        /// Accepted equipment keywords.
        keywords: KeywordSet,
    },
    /// Capacity must be at least this many beds. Unknown capacity passes.
    MinCapacity(u32),
    /// Doctor count must not exceed capacity.
    DoctorsWithinCapacity,
    /// No procedure tag may match.
    NoProcedures {
        /// Name of the forbidden procedures, used in explanations.
        description: String,
        /// Forbidden procedure keywords.
        keywords: KeywordSet,
    },
}

impl Prerequisite {
    /// Creates an equipment prerequisite.
    pub fn equipment<I, S>(description: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Prerequisite::Equipment {
            description: description.into(),
            keywords: KeywordSet::new(keywords),
        }
    }

    /// Creates a forbidden-procedures prerequisite.
    pub fn no_procedures<I, S>(description: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Prerequisite::NoProcedures {
            description: description.into(),
            keywords: KeywordSet::new(keywords),
        }
    }

    /// Describes why the facility fails this prerequisite, or `None` if met.
    pub fn unmet_reason(&self, facility: &Facility) -> Option<String> {
        match self {
            Prerequisite::Equipment {
                description,
                keywords,
            } => (!keywords.matches_any(&facility.equipment))
                .then(|| format!("no {description} listed in equipment")),
            Prerequisite::MinCapacity(min) => match facility.capacity {
                Some(capacity) if capacity < *min => Some(format!(
                    "capacity of {capacity} beds is below the {min} expected"
                )),
                _ => None,
            },
            Prerequisite::DoctorsWithinCapacity => match (facility.num_doctors, facility.capacity)
            {
                (Some(doctors), Some(capacity)) if doctors > capacity => Some(format!(
                    "{doctors} doctors reported against {capacity} beds"
                )),
                _ => None,
            },
            Prerequisite::NoProcedures {
                description,
                keywords,
            } => {
                let listed: Vec<&str> = facility
                    .procedures
                    .iter()
                    .filter(|p| keywords.matches(p))
                    .map(String::as_str)
                    .collect();
                (!listed.is_empty())
                    .then(|| format!("lists {description} ({})", listed.join(", ")))
            }
        }
    }
}

/// A claim together with its prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlausibilityRule {
    /// Rule tag reported on violations, e.g. `equipment_mismatch`.
    pub rule: String,
    /// Short description of the claim under test.
    pub description: String,
    /// Severity of every violation this rule raises.
    pub severity: ViolationSeverity,
    /// Condition under which the rule applies.
    pub claim: Claim,
    /// Requirements checked when the claim is made.
    pub prerequisites: Vec<Prerequisite>,
}

impl PlausibilityRule {
    /// Creates a rule with no prerequisites.
    pub fn new(
        rule: impl Into<String>,
        description: impl Into<String>,
        severity: ViolationSeverity,
        claim: Claim,
    ) -> Self {
        Self {
            rule: rule.into(),
            description: description.into(),
            severity,
            claim,
            prerequisites: Vec::new(),
        }
    }

    /// Adds a prerequisite.
    pub fn requires(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }

    /// Evaluates the rule, yielding one violation per unmet prerequisite.
    pub fn evaluate(&self, facility: &Facility) -> Vec<Violation> {
        if !self.claim.is_made_by(facility) {
            return Vec::new();
        }
        self.prerequisites
            .iter()
            .filter_map(|p| p.unmet_reason(facility))
            .map(|missing| Violation {
                rule: self.rule.clone(),
                severity: self.severity,
                explanation: format!("{}: {missing}", self.description),
            })
            .collect()
    }
}

fn operating_theatre() -> Prerequisite {
    Prerequisite::equipment(
        "operating theatre",
        [
            "operating theat*",
            "operating room*",
            "theatre",
            "theater",
            "surgical suite",
            "operating table",
        ],
    )
}

/// The built-in rule set.
pub fn default_rules() -> Vec<PlausibilityRule> {
    vec![
        PlausibilityRule::new(
            "equipment_mismatch",
            "cataract surgery claimed",
            ViolationSeverity::High,
            Claim::Procedure(KeywordSet::new(["cataract*"])),
        )
        .requires(Prerequisite::equipment(
            "operating microscope or phaco/ECCE set",
            [
                "operating microscope",
                "surgical microscope",
                "ophthalmic microscope",
                "phaco*",
                "ecce",
            ],
        )),
        PlausibilityRule::new(
            "equipment_mismatch",
            "caesarean section claimed",
            ViolationSeverity::Medium,
            Claim::Procedure(KeywordSet::new(["caesarean*", "cesarean*", "c section"])),
        )
        .requires(operating_theatre()),
        PlausibilityRule::new(
            "equipment_mismatch",
            "dialysis claimed",
            ViolationSeverity::Medium,
            Claim::SpecialtyOrProcedure(KeywordSet::new([
                "dialysis",
                "haemodialysis",
                "hemodialysis",
            ])),
        )
        .requires(Prerequisite::equipment(
            "dialysis machine",
            ["dialysis", "haemodialysis", "hemodialysis", "dialyser", "dialyzer"],
        )),
        PlausibilityRule::new(
            "capacity_mismatch",
            "cardiology claimed",
            ViolationSeverity::Medium,
            Claim::Specialty(KeywordSet::new(["cardiolog*", "cardiac"])),
        )
        .requires(Prerequisite::MinCapacity(50))
        .requires(Prerequisite::equipment(
            "ECG",
            ["ecg", "ekg", "electrocardiogra*"],
        ))
        .requires(Prerequisite::equipment(
            "echocardiography",
            ["echo*", "cardiac ultrasound"],
        )),
        PlausibilityRule::new(
            "infrastructure_mismatch",
            "neurosurgery claimed",
            ViolationSeverity::High,
            Claim::SpecialtyOrProcedure(KeywordSet::new([
                "neurosurg*",
                "craniotomy",
                "brain surgery",
            ])),
        )
        .requires(Prerequisite::equipment(
            "CT or MRI",
            ["ct", "mri", "computed tomography", "magnetic resonance", "cat scan"],
        ))
        .requires(Prerequisite::equipment(
            "ICU",
            ["icu", "intensive care*", "critical care"],
        ))
        .requires(operating_theatre())
        .requires(Prerequisite::MinCapacity(100)),
        PlausibilityRule::new(
            "staffing_implausible",
            "staffing figures",
            ViolationSeverity::Low,
            Claim::StaffAndCapacityReported,
        )
        .requires(Prerequisite::DoctorsWithinCapacity),
        PlausibilityRule::new(
            "facility_type_mismatch",
            "pharmacy",
            ViolationSeverity::Low,
            Claim::FacilityType(FacilityType::Pharmacy),
        )
        .requires(Prerequisite::no_procedures(
            "surgical or clinical procedures",
            [
                "surg*",
                "caesarean*",
                "cesarean*",
                "c section",
                "dialysis",
                "endoscop*",
                "anaesthe*",
                "anesthe*",
                "transfusion",
                "delivery",
            ],
        )),
    ]
}
