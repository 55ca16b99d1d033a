//! Error types for the service crate.

use std::path::PathBuf;

use facility_geo::GeoError;
use facility_geo_engine::{EngineError, ErrorKind};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur at the tool boundary or while loading data.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Analysis failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The caller exceeded its request budget.
    #[error("rate limit exceeded for caller \"{caller}\"; retry later")]
    RateLimited {
        /// Caller key that was refused.
        caller: String,
    },

    /// The argument object could not be interpreted.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// No operation with this name exists.
    #[error("unknown operation: \"{0}\"")]
    UnknownOperation(String),

    /// I/O error while reading a data file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A facility dataset could not be decoded.
    #[error("invalid facility dataset: {0}")]
    Dataset(#[from] serde_json::Error),

    /// A result could not be encoded as JSON.
    #[error("failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),

    /// A gazetteer file could not be parsed.
    #[error("invalid gazetteer: {0}")]
    Gazetteer(#[from] GeoError),
}

impl ServiceError {
    /// Creates an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Classifies the error for tool callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Engine(err) => err.kind(),
            ServiceError::RateLimited { .. } => ErrorKind::RateLimited,
            ServiceError::Gazetteer(err) if err.is_not_found() => ErrorKind::NotFound,
            ServiceError::InvalidArguments(_)
            | ServiceError::UnknownOperation(_)
            | ServiceError::Io { .. }
            | ServiceError::Dataset(_)
            | ServiceError::Encode(_)
            | ServiceError::Gazetteer(_) => ErrorKind::InvalidQuery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_is_transparent() {
        let err: ServiceError = EngineError::PlaceNotFound("Atlantis".to_string()).into();
        assert!(err.to_string().starts_with("place not found: \"Atlantis\""));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_rate_limited_kind() {
        let err = ServiceError::RateLimited {
            caller: "agent-7".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.to_string().contains("agent-7"));
    }

    #[test]
    fn test_argument_errors_are_invalid_query() {
        assert_eq!(
            ServiceError::invalid_arguments("facilityId missing").kind(),
            ErrorKind::InvalidQuery
        );
        assert_eq!(
            ServiceError::UnknownOperation("teleport".to_string()).kind(),
            ErrorKind::InvalidQuery
        );
    }

    #[test]
    fn test_io_error_display() {
        let err = ServiceError::io_error(
            "/data/facilities.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/data/facilities.json"));
    }
}
