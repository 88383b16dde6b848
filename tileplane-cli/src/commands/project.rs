//! Projection commands: `project` and `unproject`.

use tileplane::config::ConfigFile;
use tileplane::coord::{self, map_size_pixels, GeoCoordinate, PixelPoint};

use super::common::resolve_zoom;
use crate::error::CliError;

/// Print the pixel containing `lat, lon`.
pub fn run_project(lat: f64, lon: f64, zoom: Option<u8>) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    let zoom = resolve_zoom(zoom, &config)?;
    let pixel = coord::geo_to_pixel(GeoCoordinate::try_new(lat, lon)?, zoom)?;

    println!("{} {}", pixel.x, pixel.y);
    println!(
        "  zoom {}, map size {} px",
        zoom,
        map_size_pixels(zoom)
    );
    Ok(())
}

/// Print the coordinate at pixel `x, y`.
pub fn run_unproject(x: f64, y: f64, zoom: Option<u8>) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    let zoom = resolve_zoom(zoom, &config)?;
    let geo = coord::pixel_to_geo(PixelPoint::new(x, y), zoom)?;

    println!("{:.6} {:.6}", geo.latitude(), geo.longitude());
    Ok(())
}
