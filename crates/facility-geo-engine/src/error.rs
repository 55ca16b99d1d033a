//! Error types for facility analysis.

use facility_geo::{FacilityId, GeoError};
use thiserror::Error;

/// Coarse classification of every error the engine and its callers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Caller-supplied parameters are unusable; fix the input and retry.
    InvalidQuery,
    /// A referenced place, region or facility does not exist.
    NotFound,
    /// Admission was refused by the rate guard; back off and retry.
    RateLimited,
}

impl ErrorKind {
    /// Machine-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidQuery => "invalid_query",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimited => "rate_limited",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while running an analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Parameters are unusable (no center, blank specialty, grid too fine...).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Place name missing from the gazetteer.
    #[error("place not found: \"{0}\"; try a different name or explicit lat/lng")]
    PlaceNotFound(String),

    /// Region name missing from the gazetteer.
    #[error("region not found: \"{0}\"; try a different region or a bounding box")]
    RegionNotFound(String),

    /// Facility id missing from the store.
    #[error("facility not found: {0}")]
    FacilityNotFound(FacilityId),
}

impl EngineError {
    /// Creates an invalid-query error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            EngineError::PlaceNotFound(_)
            | EngineError::RegionNotFound(_)
            | EngineError::FacilityNotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<GeoError> for EngineError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::PlaceNotFound(name) => EngineError::PlaceNotFound(name),
            GeoError::RegionNotFound(name) => EngineError::RegionNotFound(name),
            other => EngineError::InvalidQuery(other.to_string()),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
