//! Helpers shared across CLI commands.

use tileplane::config::ConfigFile;
use tileplane::coord::{GeoCoordinate, ZoomLevel};

use crate::error::CliError;

/// Resolve the zoom level: CLI flag first, then config.
pub fn resolve_zoom(cli_zoom: Option<u8>, config: &ConfigFile) -> Result<ZoomLevel, CliError> {
    match cli_zoom {
        Some(level) => Ok(ZoomLevel::new(level)?),
        None => Ok(config.viewer.zoom_level),
    }
}

/// Resolve an explicit `--lat/--lon` pair, if given.
pub fn resolve_coordinate(
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<Option<GeoCoordinate>, CliError> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(GeoCoordinate::try_new(lat, lon)?)),
        (None, None) => Ok(None),
        _ => Err(CliError::Config(
            "--lat and --lon must be given together".to_string(),
        )),
    }
}
