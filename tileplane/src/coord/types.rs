//! Coordinate value types and errors for the projection engine.

use std::fmt;

use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Lowest supported zoom level.
pub const MIN_ZOOM: u8 = 1;

/// Highest supported zoom level.
pub const MAX_ZOOM: u8 = 23;

/// Errors raised by coordinate validation and projection.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    #[error("Latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Pixel ({x}, {y}) outside [0, {max}]")]
    PixelOutOfRange { x: f64, y: f64, max: f64 },

    #[error("Zoom level {0} outside [1, 23]")]
    InvalidZoom(u8),
}

impl CoordError {
    /// Returns true for errors caused by a coordinate falling off the map.
    ///
    /// A population pass recovers from these locally by showing the fallback
    /// image; `InvalidZoom` is a configuration error instead.
    pub fn is_out_of_range(&self) -> bool {
        !matches!(self, CoordError::InvalidZoom(_))
    }
}

/// A geographic coordinate in degrees (WGS-84).
///
/// Construction does not validate; projection functions call
/// [`GeoCoordinate::validate`] and reject values off the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting values outside the valid ranges.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        let coord = Self::new(latitude, longitude);
        coord.validate()?;
        Ok(coord)
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Check latitude ∈ [-90, 90] and longitude ∈ [-180, 180].
    pub fn validate(&self) -> Result<(), CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&self.latitude) {
            return Err(CoordError::LatitudeOutOfRange(self.latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(CoordError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A point on the full projected map canvas at one zoom level.
///
/// Pixel points from different zoom levels are not comparable without
/// re-projecting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this point by `(dx, dy)` pixels.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Pixel extent of one tile image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileDimensions {
    pub width: u32,
    pub height: u32,
}

impl TileDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for TileDimensions {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl fmt::Display for TileDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A validated zoom level in `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    /// Create a zoom level, rejecting values outside the supported range.
    pub fn new(level: u8) -> Result<Self, CoordError> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&level) {
            return Err(CoordError::InvalidZoom(level));
        }
        Ok(Self(level))
    }

    /// The raw zoom level.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(15)
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for ZoomLevel {
    type Error = CoordError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}
