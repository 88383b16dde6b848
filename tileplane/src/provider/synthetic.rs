//! Offline fetcher that renders solid-color tiles.
//!
//! Useful for exercising the tile plane without network access. The color
//! of each tile is derived from its coordinate so neighbouring tiles differ.

use std::time::Duration;

use crate::provider::{FetchError, FetchRequest, ImageFetcher, TileImage};

/// Synthetic fetcher producing one solid tile per request.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFetcher {
    latency: Option<Duration>,
}

impl SyntheticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch by `latency` to mimic a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn color_for(request: &FetchRequest) -> [u8; 4] {
        let r = ((request.coordinate.latitude() + 90.0) / 180.0 * 255.0) as u8;
        let g = ((request.coordinate.longitude() + 180.0) / 360.0 * 255.0) as u8;
        let b = request.zoom.get().saturating_mul(10);
        [r, g, b, 255]
    }
}

impl ImageFetcher for SyntheticFetcher {
    type Image = TileImage;

    async fn fetch(&self, request: FetchRequest) -> Result<TileImage, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(TileImage::solid(
            request.tile_dimensions,
            Self::color_for(&request),
        ))
    }

    fn name(&self) -> &str {
        "Synthetic"
    }
}
