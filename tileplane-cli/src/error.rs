//! CLI error type.

use std::fmt;

use tileplane::config::ConfigError;
use tileplane::coord::CoordError;
use tileplane::logging::LoggingError;
use tileplane::plane::PlaneError;
use tileplane::provider::FetchError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration.
    Config(String),

    /// Coordinate or pixel outside the map.
    Coord(CoordError),

    /// Tile plane rejected its setup.
    Plane(PlaneError),

    /// Provider request failed.
    Fetch(FetchError),

    /// Location query matched nothing.
    LocationNotFound(String),

    /// Logging could not be set up.
    Logging(LoggingError),

    /// Failed to create the Tokio runtime.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Coord(e) => write!(f, "Projection error: {}", e),
            CliError::Plane(e) => write!(f, "Tile plane error: {}", e),
            CliError::Fetch(e) => write!(f, "Provider error: {}", e),
            CliError::LocationNotFound(query) => {
                write!(f, "No location found for '{}'", query)
            }
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Coord(e) => Some(e),
            CliError::Plane(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Config(_) | CliError::LocationNotFound(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coord(e)
    }
}

impl From<PlaneError> for CliError {
    fn from(e: PlaneError) -> Self {
        CliError::Plane(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = CliError::LocationNotFound("Atlantis".to_string());
        assert_eq!(err.to_string(), "No location found for 'Atlantis'");

        let err: CliError = CoordError::LatitudeOutOfRange(91.0).into();
        assert!(err.to_string().starts_with("Projection error"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let err: CliError = FetchError::MissingApiKey.into();
        assert!(err.source().is_some());
        assert!(CliError::Config("x".to_string()).source().is_none());
    }
}
