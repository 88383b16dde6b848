//! Tileplane - bounded map tile plane with asynchronous population
//!
//! This library keeps a fixed N×N grid of map tiles centered on a
//! geographic coordinate, filled concurrently from an imagery provider.
//!
//! - [`coord`] - spherical Mercator projection between coordinates and pixels
//! - [`plane`] - the tile plane cache and its population passes
//! - [`viewport`] - bounded panning over a plane
//! - [`provider`] - imagery fetchers and location lookup
//! - [`config`] - INI configuration file
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod coord;
pub mod logging;
pub mod plane;
pub mod provider;
pub mod viewport;

pub use coord::{GeoCoordinate, PixelPoint, TileDimensions, ZoomLevel};
pub use plane::{CachePhase, PlaneError, TilePlaneCache};
pub use provider::{ImageFetcher, ViewType};
pub use viewport::ViewportPanner;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
