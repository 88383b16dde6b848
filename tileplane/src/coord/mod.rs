//! Projection engine
//!
//! Converts between geographic coordinates (latitude/longitude) and pixel
//! coordinates on the spherical-Mercator map canvas at a given zoom level.
//! All functions are pure and can be called from any thread.

mod types;

pub use types::{
    CoordError, GeoCoordinate, PixelPoint, TileDimensions, ZoomLevel, MAX_LAT, MAX_LON, MAX_ZOOM,
    MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Edge length in pixels of the map canvas at zoom level 0.
pub const BASE_MAP_SIZE: u64 = 256;

/// Returns the width and height of the map canvas in pixels.
///
/// The canvas doubles in both dimensions with every zoom level.
#[inline]
pub fn map_size_pixels(zoom: ZoomLevel) -> u64 {
    BASE_MAP_SIZE << zoom.get()
}

/// Folds `n` into `[lo, hi)` using modular arithmetic on `hi - lo`.
///
/// Values outside the bounds wrap around instead of being clamped, which
/// keeps intermediate results continuous across the antimeridian. Infinite
/// values (the poles in Mercator space) are pinned to the matching edge.
#[inline]
pub fn clip(n: f64, lo: f64, hi: f64) -> f64 {
    let range = hi - lo;
    if range <= 0.0 || range.is_nan() {
        return lo;
    }
    if n.is_infinite() {
        return if n < 0.0 { lo } else { hi };
    }
    (n - lo).rem_euclid(range) + lo
}

/// Projects a geographic coordinate to a pixel on the map canvas.
///
/// # Arguments
///
/// * `coord` - Latitude in [-90, 90], longitude in [-180, 180]
/// * `zoom` - Zoom level
///
/// # Returns
///
/// The pixel containing the coordinate, floored to whole pixels, or an
/// out-of-range error if the coordinate is off the globe.
#[inline]
pub fn geo_to_pixel(coord: GeoCoordinate, zoom: ZoomLevel) -> Result<PixelPoint, CoordError> {
    coord.validate()?;

    let x = (coord.longitude() + 180.0) / 360.0;
    let sin_lat = (coord.latitude() * PI / 180.0).sin();
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

    let map_size = map_size_pixels(zoom) as f64;
    let pixel_x = clip(x * map_size + 0.5, 0.0, map_size - 1.0).floor();
    let pixel_y = clip(y * map_size + 0.5, 0.0, map_size - 1.0).floor();

    Ok(PixelPoint::new(pixel_x, pixel_y))
}

/// Converts a pixel on the map canvas back to a geographic coordinate.
///
/// Fails if either axis is outside `[0, map_size - 1]`.
#[inline]
pub fn pixel_to_geo(point: PixelPoint, zoom: ZoomLevel) -> Result<GeoCoordinate, CoordError> {
    let map_size = map_size_pixels(zoom) as f64;
    let max = map_size - 1.0;

    let in_bounds = |v: f64| (0.0..=max).contains(&v);
    if !in_bounds(point.x) || !in_bounds(point.y) {
        return Err(CoordError::PixelOutOfRange {
            x: point.x,
            y: point.y,
            max,
        });
    }

    let x = point.x / map_size - 0.5;
    let y = 0.5 - point.y / map_size;

    let latitude = clip(
        90.0 - 360.0 * (-y * 2.0 * PI).exp().atan() / PI,
        MIN_LAT,
        MAX_LAT,
    );
    let longitude = clip(360.0 * x, MIN_LON, MAX_LON);

    Ok(GeoCoordinate::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoom(level: u8) -> ZoomLevel {
        ZoomLevel::new(level).unwrap()
    }

    #[test]
    fn test_map_size_at_zoom_1() {
        assert_eq!(map_size_pixels(zoom(1)), 512);
    }

    #[test]
    fn test_map_size_at_max_zoom() {
        assert_eq!(map_size_pixels(zoom(23)), 256u64 << 23);
    }

    #[test]
    fn test_origin_at_zoom_1_is_map_center() {
        let pixel = geo_to_pixel(GeoCoordinate::new(0.0, 0.0), zoom(1)).unwrap();
        assert_eq!(pixel, PixelPoint::new(256.0, 256.0));
    }

    #[test]
    fn test_map_center_back_to_origin() {
        let coord = pixel_to_geo(PixelPoint::new(256.0, 256.0), zoom(1)).unwrap();
        assert!(coord.latitude().abs() < 1e-9);
        assert!(coord.longitude().abs() < 1e-9);
    }

    #[test]
    fn test_redmond_at_zoom_15() {
        // Microsoft campus, Redmond WA
        let coord = GeoCoordinate::new(47.639597, -122.12845);
        let pixel = geo_to_pixel(coord, zoom(15)).unwrap();

        assert_eq!(pixel.x, pixel.x.floor());
        assert_eq!(pixel.y, pixel.y.floor());

        let back = pixel_to_geo(pixel, zoom(15)).unwrap();
        assert!((back.latitude() - coord.latitude()).abs() < 1e-4);
        assert!((back.longitude() - coord.longitude()).abs() < 1e-4);
    }

    #[test]
    fn test_latitude_91_rejected() {
        let result = geo_to_pixel(GeoCoordinate::new(91.0, 0.0), zoom(10));
        assert!(matches!(result, Err(CoordError::LatitudeOutOfRange(_))));
    }

    #[test]
    fn test_longitude_181_rejected() {
        let result = geo_to_pixel(GeoCoordinate::new(0.0, 181.0), zoom(10));
        assert!(matches!(result, Err(CoordError::LongitudeOutOfRange(_))));
    }

    #[test]
    fn test_pixel_at_map_size_rejected() {
        let size = map_size_pixels(zoom(1)) as f64;
        let result = pixel_to_geo(PixelPoint::new(size, 0.0), zoom(1));
        assert!(matches!(result, Err(CoordError::PixelOutOfRange { .. })));
    }

    #[test]
    fn test_negative_pixel_rejected() {
        let result = pixel_to_geo(PixelPoint::new(10.0, -1.0), zoom(3));
        assert!(matches!(result, Err(CoordError::PixelOutOfRange { .. })));
    }

    #[test]
    fn test_last_pixel_accepted() {
        let max = map_size_pixels(zoom(2)) as f64 - 1.0;
        assert!(pixel_to_geo(PixelPoint::new(max, max), zoom(2)).is_ok());
    }

    #[test]
    fn test_poles_pinned_to_edges() {
        let max = map_size_pixels(zoom(4)) as f64 - 1.0;
        let north = geo_to_pixel(GeoCoordinate::new(90.0, 0.0), zoom(4)).unwrap();
        let south = geo_to_pixel(GeoCoordinate::new(-90.0, 0.0), zoom(4)).unwrap();
        assert_eq!(north.y, 0.0);
        assert_eq!(south.y, max);
    }

    #[test]
    fn test_clip_wraps_instead_of_clamping() {
        assert_eq!(clip(190.0, -180.0, 180.0), -170.0);
        assert_eq!(clip(-190.0, -180.0, 180.0), 170.0);
        assert_eq!(clip(513.0, 0.0, 511.0), 2.0);
        assert_eq!(clip(-1.0, 0.0, 511.0), 510.0);
    }

    #[test]
    fn test_clip_inside_range_unchanged() {
        assert_eq!(clip(42.5, 0.0, 511.0), 42.5);
        assert_eq!(clip(-45.0, -90.0, 90.0), -45.0);
    }

    #[test]
    fn test_clip_degenerate_range() {
        assert_eq!(clip(5.0, 3.0, 3.0), 3.0);
    }

    #[test]
    fn test_longitude_increases_eastward() {
        let west = geo_to_pixel(GeoCoordinate::new(10.0, -60.0), zoom(8)).unwrap();
        let east = geo_to_pixel(GeoCoordinate::new(10.0, 60.0), zoom(8)).unwrap();
        assert!(west.x < east.x);
    }

    #[test]
    fn test_latitude_increases_northward() {
        let south = geo_to_pixel(GeoCoordinate::new(-30.0, 5.0), zoom(8)).unwrap();
        let north = geo_to_pixel(GeoCoordinate::new(30.0, 5.0), zoom(8)).unwrap();
        assert!(north.y < south.y);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_map_size_doubles(level in MIN_ZOOM..MAX_ZOOM) {
                let here = map_size_pixels(ZoomLevel::new(level).unwrap());
                let next = map_size_pixels(ZoomLevel::new(level + 1).unwrap());
                prop_assert_eq!(next, 2 * here);
            }

            #[test]
            fn test_roundtrip_property(
                lat in -80.0..80.0_f64,
                lon in -170.0..170.0_f64,
                level in MIN_ZOOM..=MAX_ZOOM
            ) {
                let zoom = ZoomLevel::new(level).unwrap();
                let pixel = geo_to_pixel(GeoCoordinate::new(lat, lon), zoom)?;
                let back = pixel_to_geo(pixel, zoom)?;

                // One pixel expressed in degrees bounds the rounding error
                let tolerance = 360.0 / map_size_pixels(zoom) as f64;

                prop_assert!(
                    (back.latitude() - lat).abs() <= tolerance,
                    "Latitude roundtrip failed: {} -> {} at zoom {}",
                    lat, back.latitude(), level
                );
                prop_assert!(
                    (back.longitude() - lon).abs() <= tolerance,
                    "Longitude roundtrip failed: {} -> {} at zoom {}",
                    lon, back.longitude(), level
                );
            }

            #[test]
            fn test_pixels_within_canvas(
                lat in -90.0..=90.0_f64,
                lon in -180.0..=180.0_f64,
                level in MIN_ZOOM..=MAX_ZOOM
            ) {
                let zoom = ZoomLevel::new(level).unwrap();
                let pixel = geo_to_pixel(GeoCoordinate::new(lat, lon), zoom)?;
                let max = map_size_pixels(zoom) as f64 - 1.0;

                prop_assert!(pixel.x >= 0.0 && pixel.x <= max);
                prop_assert!(pixel.y >= 0.0 && pixel.y <= max);
            }

            #[test]
            fn test_pixel_to_geo_within_globe(
                fx in 0.0..1.0_f64,
                fy in 0.0..1.0_f64,
                level in MIN_ZOOM..=MAX_ZOOM
            ) {
                let zoom = ZoomLevel::new(level).unwrap();
                let max = map_size_pixels(zoom) as f64 - 1.0;
                let coord = pixel_to_geo(PixelPoint::new(fx * max, fy * max), zoom)?;

                prop_assert!(coord.validate().is_ok());
            }

            #[test]
            fn test_reject_invalid_latitude(
                lat in 90.001..1000.0_f64,
                lon in -180.0..180.0_f64,
                level in MIN_ZOOM..=MAX_ZOOM
            ) {
                let zoom = ZoomLevel::new(level).unwrap();
                let result = geo_to_pixel(GeoCoordinate::new(lat, lon), zoom);
                prop_assert!(matches!(result, Err(CoordError::LatitudeOutOfRange(_))));
            }

            #[test]
            fn test_reject_pixel_beyond_canvas(
                extra in 0.0..1_000.0_f64,
                level in MIN_ZOOM..=MAX_ZOOM
            ) {
                let zoom = ZoomLevel::new(level).unwrap();
                let size = map_size_pixels(zoom) as f64;
                let result = pixel_to_geo(PixelPoint::new(size + extra, 0.0), zoom);
                prop_assert!(
                    matches!(result, Err(CoordError::PixelOutOfRange { .. })),
                    "expected PixelOutOfRange, got {:?}",
                    result
                );
            }
        }
    }
}
