//! Viewport panner.
//!
//! Tracks a pan offset from the plane's center and keeps it within the
//! area the plane covers, so the viewport never slides past the loaded
//! tiles. Re-centering and view style changes go through the cache.

use std::sync::Arc;

use tracing::debug;

use crate::coord::{self, CoordError, GeoCoordinate, PixelPoint};
use crate::plane::TilePlaneCache;
use crate::provider::{ImageFetcher, ViewType};

/// Pans a viewport across a [`TilePlaneCache`].
pub struct ViewportPanner<F: ImageFetcher> {
    cache: Arc<TilePlaneCache<F>>,
    center: GeoCoordinate,
    offset: PixelPoint,
    max_offset: PixelPoint,
    view_type: ViewType,
}

impl<F: ImageFetcher> ViewportPanner<F> {
    /// Create a panner and start populating the plane around `start`.
    pub fn new(cache: Arc<TilePlaneCache<F>>, start: GeoCoordinate) -> Self {
        let half = cache.center_index() as f64;
        let dims = cache.tile_dimensions();
        let max_offset = PixelPoint::new(
            half * f64::from(dims.width),
            half * f64::from(dims.height),
        );
        let view_type = cache.view_type();

        cache.initialize_plane(start);

        Self {
            cache,
            center: start,
            offset: PixelPoint::default(),
            max_offset,
            view_type,
        }
    }

    /// Move the viewport by `(dx, dy)` pixels.
    ///
    /// Each axis is checked on its own: an axis whose new offset would leave
    /// `[-max, max]` keeps its previous value while the other axis still
    /// moves. Returns the resulting offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> PixelPoint {
        let x = self.offset.x + dx;
        let y = self.offset.y + dy;

        if x.abs() <= self.max_offset.x {
            self.offset.x = x;
        }
        if y.abs() <= self.max_offset.y {
            self.offset.y = y;
        }

        debug!(dx, dy, x = self.offset.x, y = self.offset.y, "Viewport panned");
        self.offset
    }

    /// Re-center on `coordinate`, clearing the pan offset.
    pub fn center_on(&mut self, coordinate: GeoCoordinate) {
        self.center = coordinate;
        self.offset = PixelPoint::default();
        self.cache.initialize_plane(coordinate);
    }

    /// Reload the plane around the current center with the panner's view type.
    pub fn refresh(&self) {
        self.cache.set_view_type(self.view_type);
        self.cache.initialize_plane(self.center);
    }

    /// Change the view type applied on the next [`refresh`](Self::refresh).
    pub fn set_view_type(&mut self, view_type: ViewType) {
        self.view_type = view_type;
    }

    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    pub fn center(&self) -> GeoCoordinate {
        self.center
    }

    pub fn offset(&self) -> PixelPoint {
        self.offset
    }

    /// Largest allowed absolute offset on each axis.
    pub fn max_offset(&self) -> PixelPoint {
        self.max_offset
    }

    pub fn cache(&self) -> &Arc<TilePlaneCache<F>> {
        &self.cache
    }

    /// Coordinate under the middle of the viewport.
    pub fn focused_coordinate(&self) -> Result<GeoCoordinate, CoordError> {
        let zoom = self.cache.zoom_level();
        let pixel = coord::geo_to_pixel(self.center, zoom)?;
        coord::pixel_to_geo(pixel.offset(self.offset.x, self.offset.y), zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileDimensions;
    use crate::plane::CachePhase;
    use crate::provider::{SyntheticFetcher, TileImage};

    const REDMOND: GeoCoordinate = GeoCoordinate::new(47.639597, -122.12845);

    fn panner(size: usize) -> ViewportPanner<SyntheticFetcher> {
        let dims = TileDimensions::new(256, 128);
        let cache = TilePlaneCache::new(
            size,
            dims,
            TileImage::solid(dims, [0, 0, 0, 255]),
            Arc::new(SyntheticFetcher::new()),
        )
        .unwrap();
        ViewportPanner::new(Arc::new(cache), REDMOND)
    }

    #[tokio::test]
    async fn test_new_starts_pass() {
        let panner = panner(3);
        assert_eq!(panner.cache().phase(), CachePhase::InitializingTiles);
        assert_eq!(panner.cache().anchor(), Some(REDMOND));
        assert_eq!(panner.max_offset(), PixelPoint::new(256.0, 128.0));
    }

    #[tokio::test]
    async fn test_pan_within_bounds() {
        let mut panner = panner(3);
        assert_eq!(panner.pan_by(100.0, -50.0), PixelPoint::new(100.0, -50.0));
        assert_eq!(panner.pan_by(156.0, -78.0), PixelPoint::new(256.0, -128.0));
    }

    #[tokio::test]
    async fn test_pan_rejects_each_axis_separately() {
        let mut panner = panner(3);
        panner.pan_by(200.0, 0.0);

        let offset = panner.pan_by(100.0, 60.0);
        assert_eq!(offset, PixelPoint::new(200.0, 60.0));

        let offset = panner.pan_by(-10.0, 100.0);
        assert_eq!(offset, PixelPoint::new(190.0, 60.0));
    }

    #[tokio::test]
    async fn test_pan_negative_y_is_bounded() {
        let mut panner = panner(3);
        let offset = panner.pan_by(0.0, -500.0);
        assert_eq!(offset, PixelPoint::new(0.0, 0.0));
    }

    #[tokio::test]
    async fn test_single_slot_plane_cannot_pan() {
        let mut panner = panner(1);
        assert_eq!(panner.pan_by(1.0, 1.0), PixelPoint::default());
    }

    #[tokio::test]
    async fn test_center_on_resets_offset() {
        let mut panner = panner(3);
        panner.cache().wait_until_idle().await;
        panner.pan_by(10.0, 10.0);

        let seattle = GeoCoordinate::new(47.60357, -122.32945);
        panner.center_on(seattle);

        assert_eq!(panner.offset(), PixelPoint::default());
        assert_eq!(panner.center(), seattle);
        assert_eq!(panner.cache().anchor(), Some(seattle));
    }

    #[tokio::test]
    async fn test_refresh_pushes_view_type() {
        let mut panner = panner(3);
        panner.cache().wait_until_idle().await;

        panner.set_view_type(ViewType::Road);
        assert_eq!(panner.cache().view_type(), ViewType::Aerial);

        panner.refresh();
        assert_eq!(panner.cache().view_type(), ViewType::Road);
        assert_eq!(panner.cache().metrics().snapshot().passes_started, 2);
    }

    #[tokio::test]
    async fn test_focused_coordinate_follows_offset() {
        let mut panner = panner(3);
        let start = panner.focused_coordinate().unwrap();
        assert!((start.latitude() - REDMOND.latitude()).abs() < 1e-3);

        panner.pan_by(200.0, 0.0);
        let moved = panner.focused_coordinate().unwrap();
        assert!(moved.longitude() > start.longitude());
        assert!((moved.latitude() - start.latitude()).abs() < 1e-3);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_pan_never_exceeds_bound(
                grid_size in prop::sample::select(vec![1usize, 3, 5, 7]),
                width in 1u32..512,
                height in 1u32..512,
                steps in prop::collection::vec((-800.0..800.0_f64, -800.0..800.0_f64), 1..40)
            ) {
                let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let _guard = runtime.enter();

                let dims = TileDimensions::new(width, height);
                let cache = TilePlaneCache::new(
                    grid_size,
                    dims,
                    TileImage::solid(TileDimensions::new(1, 1), [0, 0, 0, 255]),
                    Arc::new(SyntheticFetcher::new()),
                )
                .unwrap();
                let mut panner = ViewportPanner::new(Arc::new(cache), REDMOND);
                let max = panner.max_offset();

                for (dx, dy) in steps {
                    let before = panner.offset();
                    let after = panner.pan_by(dx, dy);
                    prop_assert!(after.x.abs() <= max.x);
                    prop_assert!(after.y.abs() <= max.y);
                    // Each axis either took the whole delta or stayed put.
                    prop_assert!(after.x == before.x + dx || after.x == before.x);
                    prop_assert!(after.y == before.y + dy || after.y == before.y);
                }
            }
        }
    }
}
