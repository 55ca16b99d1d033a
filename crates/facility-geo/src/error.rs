//! Error types for coordinates, parsing and geocoding.

use thiserror::Error;

/// Errors produced while validating coordinates, parsing literals or
/// resolving place names.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// Parse error at a specific position in the input.
    #[error("parse error at position {position}: {message}")]
    ParseError {
        /// Position in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// Parse error on a specific line of a gazetteer file.
    #[error("gazetteer line {line}: {message}")]
    GazetteerLine {
        /// 1-based line number.
        line: usize,
        /// Description of the error.
        message: String,
    },

    /// Latitude outside -90..=90 or not finite.
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside -180..=180 or not finite.
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Bounding box with inverted or degenerate edges.
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Place name that is empty after trimming.
    #[error("place name is empty")]
    EmptyPlaceName,

    /// Place name absent from the gazetteer.
    #[error("place not found: \"{0}\"")]
    PlaceNotFound(String),

    /// Region name absent from the gazetteer.
    #[error("region not found: \"{0}\"")]
    RegionNotFound(String),
}

impl GeoError {
    /// Returns true for lookups that found nothing, as opposed to bad input.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeoError::PlaceNotFound(_) | GeoError::RegionNotFound(_))
    }
}

/// Result type for geo operations.
pub type GeoResult<T> = std::result::Result<T, GeoError>;
