//! Static map imagery fetcher.
//!
//! Requests one rendered image per tile from a static map REST endpoint,
//! centered on the tile's geographic coordinate.
//!
//! # URL Pattern
//!
//! `https://dev.virtualearth.net/REST/V1/Imagery/Map/{viewType}/{lat},{lon}/{zoom}?mapSize={w},{h}&key={key}`
//!
//! - The center point is the tile center, not a tile corner
//! - Requires an API key
//! - The endpoint renders zoom levels 1 to 20 only
//!
//! # Map Size
//!
//! The endpoint renders widths of 80 to 2000 pixels and heights of 80 to
//! 1500 pixels. Tiles outside that range are rejected rather than resized,
//! since a resized image would no longer line up with the plane's spacing.

use image::{Rgba, RgbaImage};

use crate::coord::TileDimensions;
use crate::provider::{AsyncHttpClient, FetchError, FetchRequest, ImageFetcher};

/// Base URL for the static map imagery endpoint.
const STATIC_MAP_BASE_URL: &str = "https://dev.virtualearth.net/REST/V1/Imagery/Map";

/// Highest zoom level rendered by the endpoint.
const MAX_ZOOM: u8 = 20;

const MIN_MAP_SIZE: u32 = 80;
const MAX_MAP_WIDTH: u32 = 2000;
const MAX_MAP_HEIGHT: u32 = 1500;

/// A decoded tile raster in RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pixels: RgbaImage,
}

impl TileImage {
    /// Decode an encoded image (JPEG, PNG, ...) into a tile image.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, FetchError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    /// A tile filled with one color.
    pub fn solid(dimensions: TileDimensions, rgba: [u8; 4]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(dimensions.width, dimensions.height, Rgba(rgba)),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the raw RGBA pixels.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Static map imagery fetcher.
///
/// # Example
///
/// ```no_run
/// use tileplane::provider::{AsyncReqwestClient, StaticMapFetcher};
///
/// let client = AsyncReqwestClient::new().unwrap();
/// let fetcher = StaticMapFetcher::new(client, "YOUR_API_KEY").unwrap();
/// // Hand the fetcher to a TilePlaneCache...
/// ```
pub struct StaticMapFetcher<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
}

impl<C: AsyncHttpClient> StaticMapFetcher<C> {
    /// Creates a new fetcher.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `api_key` - Endpoint API key; must not be empty
    pub fn new(http_client: C, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FetchError::MissingApiKey);
        }
        Ok(Self {
            http_client,
            api_key,
        })
    }

    /// Check that the endpoint can render tiles of `dimensions`.
    pub fn check_tile_dimensions(dimensions: TileDimensions) -> Result<(), FetchError> {
        let width_ok = (MIN_MAP_SIZE..=MAX_MAP_WIDTH).contains(&dimensions.width);
        let height_ok = (MIN_MAP_SIZE..=MAX_MAP_HEIGHT).contains(&dimensions.height);
        if width_ok && height_ok {
            Ok(())
        } else {
            Err(FetchError::UnsupportedTileSize {
                width: dimensions.width,
                height: dimensions.height,
            })
        }
    }

    /// Builds the image URL for a request.
    fn build_url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/{}/{},{}/{}?mapSize={},{}&key={}",
            STATIC_MAP_BASE_URL,
            request.view_type,
            request.coordinate.latitude(),
            request.coordinate.longitude(),
            request.zoom,
            request.tile_dimensions.width,
            request.tile_dimensions.height,
            self.api_key
        )
    }
}

impl<C: AsyncHttpClient> ImageFetcher for StaticMapFetcher<C> {
    type Image = TileImage;

    async fn fetch(&self, request: FetchRequest) -> Result<TileImage, FetchError> {
        if request.zoom.get() > MAX_ZOOM {
            return Err(FetchError::UnsupportedZoom(request.zoom.get()));
        }
        Self::check_tile_dimensions(request.tile_dimensions)?;

        let url = self.build_url(&request);
        let body = self.http_client.get(&url).await?;
        TileImage::from_encoded(&body)
    }

    fn name(&self) -> &str {
        "Static Map"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{GeoCoordinate, ZoomLevel};
    use crate::provider::{MockAsyncHttpClient, ViewType};
    use std::io::Cursor;

    fn sample_png() -> Vec<u8> {
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn request(zoom: u8, view_type: ViewType) -> FetchRequest {
        FetchRequest {
            coordinate: GeoCoordinate::new(47.5, -122.25),
            tile_dimensions: TileDimensions::new(256, 256),
            zoom: ZoomLevel::new(zoom).unwrap(),
            view_type,
        }
    }

    fn fetcher(response: Result<Vec<u8>, FetchError>) -> StaticMapFetcher<MockAsyncHttpClient> {
        StaticMapFetcher::new(MockAsyncHttpClient { response }, "test_key").unwrap()
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let client = MockAsyncHttpClient {
            response: Ok(vec![]),
        };
        let result = StaticMapFetcher::new(client, "  ");
        assert!(matches!(result, Err(FetchError::MissingApiKey)));
    }

    #[test]
    fn test_url_construction() {
        let fetcher = fetcher(Ok(vec![]));
        let url = fetcher.build_url(&request(15, ViewType::Aerial));
        assert_eq!(
            url,
            "https://dev.virtualearth.net/REST/V1/Imagery/Map/Aerial/47.5,-122.25/15?mapSize=256,256&key=test_key"
        );
    }

    #[test]
    fn test_url_uses_view_type_name() {
        let fetcher = fetcher(Ok(vec![]));
        let url = fetcher.build_url(&request(10, ViewType::CanvasDark));
        assert!(url.contains("/Map/CanvasDark/"));
    }

    #[test]
    fn test_tile_dimension_limits() {
        type Fetcher = StaticMapFetcher<MockAsyncHttpClient>;
        assert!(Fetcher::check_tile_dimensions(TileDimensions::new(80, 80)).is_ok());
        assert!(Fetcher::check_tile_dimensions(TileDimensions::new(2000, 1500)).is_ok());
        assert_eq!(
            Fetcher::check_tile_dimensions(TileDimensions::new(40, 256)),
            Err(FetchError::UnsupportedTileSize {
                width: 40,
                height: 256
            })
        );
        assert!(Fetcher::check_tile_dimensions(TileDimensions::new(256, 1501)).is_err());
    }

    #[tokio::test]
    async fn test_fetch_rejects_small_tiles() {
        let fetcher = fetcher(Ok(sample_png()));
        let mut req = request(10, ViewType::Road);
        req.tile_dimensions = TileDimensions::new(64, 64);
        let result = fetcher.fetch(req).await;
        assert!(matches!(
            result,
            Err(FetchError::UnsupportedTileSize { width: 64, height: 64 })
        ));
    }

    #[tokio::test]
    async fn test_fetch_decodes_image() {
        let fetcher = fetcher(Ok(sample_png()));
        let image = fetcher.fetch(request(12, ViewType::Aerial)).await.unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
        assert_eq!(image.as_rgba().get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_zoom() {
        let fetcher = fetcher(Ok(sample_png()));
        let result = fetcher.fetch(request(21, ViewType::Aerial)).await;
        assert!(matches!(result, Err(FetchError::UnsupportedZoom(21))));
    }

    #[tokio::test]
    async fn test_fetch_reports_decode_error() {
        let fetcher = fetcher(Ok(vec![0x00, 0x01, 0x02]));
        let result = fetcher.fetch(request(12, ViewType::Aerial)).await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_propagates_http_error() {
        let fetcher = fetcher(Err(FetchError::Http("HTTP 401".to_string())));
        let result = fetcher.fetch(request(12, ViewType::Aerial)).await;
        assert_eq!(result, Err(FetchError::Http("HTTP 401".to_string())));
    }

    #[test]
    fn test_solid_tile_dimensions() {
        let tile = TileImage::solid(TileDimensions::new(8, 6), [1, 2, 3, 4]);
        assert_eq!(tile.width(), 8);
        assert_eq!(tile.height(), 6);
    }
}
