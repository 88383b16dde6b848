//! Core types for imagery fetchers.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use thiserror::Error;

use crate::coord::{GeoCoordinate, TileDimensions, ZoomLevel};

/// Errors reported by an image fetch.
///
/// The tile plane cache never surfaces these to its caller; a failed fetch
/// resolves the slot to the fallback image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded as an image.
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Response body could not be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(String),

    /// The endpoint does not serve this zoom level.
    #[error("Unsupported zoom level: {0}")]
    UnsupportedZoom(u8),

    /// The endpoint cannot render tiles of this size.
    #[error("Unsupported tile size: {width}x{height}")]
    UnsupportedTileSize { width: u32, height: u32 },

    /// The endpoint requires an API key and none was supplied.
    #[error("API key is missing")]
    MissingApiKey,

    /// The fetch task panicked or was cancelled before producing a result.
    #[error("Fetch task aborted: {0}")]
    Aborted(String),
}

/// Imagery style requested from the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewType {
    #[default]
    Aerial,
    AerialWithLabels,
    Road,
    CanvasDark,
    CanvasLight,
    CanvasGray,
}

impl ViewType {
    /// Every supported view type, in display order.
    pub const ALL: [ViewType; 6] = [
        ViewType::Aerial,
        ViewType::AerialWithLabels,
        ViewType::Road,
        ViewType::CanvasDark,
        ViewType::CanvasLight,
        ViewType::CanvasGray,
    ];

    /// The imagery set name used in endpoint URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Aerial => "Aerial",
            ViewType::AerialWithLabels => "AerialWithLabels",
            ViewType::Road => "Road",
            ViewType::CanvasDark => "CanvasDark",
            ViewType::CanvasLight => "CanvasLight",
            ViewType::CanvasGray => "CanvasGray",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown view type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown view type '{0}'")]
pub struct UnknownViewType(pub String);

impl FromStr for ViewType {
    type Err = UnknownViewType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ViewType::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownViewType(s.to_string()))
    }
}

/// Everything a fetcher needs to produce one tile image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    /// Geographic center of the tile.
    pub coordinate: GeoCoordinate,
    /// Requested image size.
    pub tile_dimensions: TileDimensions,
    /// Zoom level the tile is rendered at.
    pub zoom: ZoomLevel,
    /// Imagery style.
    pub view_type: ViewType,
}

/// Asynchronous source of tile images.
///
/// One call is made per slot per population pass. Failure is reported as an
/// `Err` value and must never panic into the caller.
///
/// # Associated Types
///
/// * `Image` - The opaque raster resource. Dropping it releases it.
pub trait ImageFetcher: Send + Sync + 'static {
    type Image: Send + Sync + 'static;

    /// Fetches the image for one tile.
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<Self::Image, FetchError>> + Send;

    /// Human-readable fetcher name for logs.
    fn name(&self) -> &str;
}
