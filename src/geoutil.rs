//! Geographic utility functions.
//!
//! Bounding boxes, longitude normalization, Web Mercator conversion and the
//! zoom level that fits an extent on screen.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{CarbonarrError, Result};

/// Earth radius used by the spherical Web Mercator projection (EPSG:3857)
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Maximum latitude representable in Web Mercator
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Highest zoom level a fitted view may use
pub const MAX_FIT_ZOOM: u8 = 18;

/// An axis-aligned extent in (x, y) order, usually (longitude, latitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty input
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds::new(first[0], first[1], first[0], first[1]);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Grow the bounds to include a point
    pub fn extend(&mut self, point: [f64; 2]) {
        self.min_x = self.min_x.min(point[0]);
        self.min_y = self.min_y.min(point[1]);
        self.max_x = self.max_x.max(point[0]);
        self.max_y = self.max_y.max(point[1]);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center as a `[lat, lon]` pair, the order the map viewport uses
    pub fn center_lat_lon(&self) -> [f64; 2] {
        [
            (self.min_y + self.max_y) / 2.0,
            (self.min_x + self.max_x) / 2.0,
        ]
    }

    /// `[min_x, min_y, max_x, max_y]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

/// Normalize a longitude value to the range [-180, 180)
pub fn normalize_longitude(lon: f64) -> f64 {
    let mut normalized = ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;

    // Exactly 180.0 maps onto -180.0
    if normalized == 180.0 {
        normalized = -180.0;
    }

    normalized
}

/// Convert Web Mercator metres to `(lon, lat)` degrees
pub fn web_mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Convert `(lon, lat)` degrees to Web Mercator metres
pub fn lon_lat_to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let x = WEB_MERCATOR_RADIUS * lon.to_radians();
    let y = WEB_MERCATOR_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Reproject Web Mercator bounds to geographic bounds
pub fn web_mercator_bounds_to_lon_lat(bounds: &Bounds) -> Bounds {
    let (min_lon, min_lat) = web_mercator_to_lon_lat(bounds.min_x, bounds.min_y);
    let (max_lon, max_lat) = web_mercator_to_lon_lat(bounds.max_x, bounds.max_y);
    Bounds::new(min_lon, min_lat, max_lon, max_lat)
}

/// Largest zoom level at which the whole extent fits in a single 256px tile.
///
/// A tile spans `360 / 2^z` degrees, so the level is `floor(log2(360 / span))`
/// over the larger of the two spans, clamped to `[0, MAX_FIT_ZOOM]`.
pub fn fit_zoom(bounds: &Bounds) -> u8 {
    let span = bounds.width().abs().max(bounds.height().abs());
    if !span.is_finite() || span <= 0.0 {
        return MAX_FIT_ZOOM;
    }

    let zoom = (360.0 / span).log2().floor();
    zoom.clamp(0.0, MAX_FIT_ZOOM as f64) as u8
}

/// Validate a `[lat, lon]` viewport center
pub fn validate_center(center: [f64; 2]) -> Result<()> {
    let [lat, lon] = center;
    if !lat.is_finite() || !lon.is_finite() {
        return Err(CarbonarrError::invalid_argument(
            "center",
            format!("Center must be finite, got [{}, {}]", lat, lon),
        ));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CarbonarrError::invalid_argument(
            "center",
            format!("Latitude must be in the range -90 to 90, got {}", lat),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(0.0), 0.0);
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(370.0), 10.0);
        assert_eq!(normalize_longitude(-370.0), -10.0);
    }

    #[test]
    fn test_bounds_from_points() {
        assert!(Bounds::from_points(Vec::<[f64; 2]>::new()).is_none());

        let bounds = Bounds::from_points(vec![[77.0, 27.0], [78.5, 26.0], [77.5, 28.0]]).unwrap();
        assert_eq!(bounds.to_array(), [77.0, 26.0, 78.5, 28.0]);
        assert_eq!(bounds.center_lat_lon(), [27.0, 77.75]);
    }

    #[test]
    fn test_web_mercator_round_trip_at_origin_and_edge() {
        let (lon, lat) = web_mercator_to_lon_lat(0.0, 0.0);
        assert!(lon.abs() < 1e-9);
        assert!(lat.abs() < 1e-9);

        let (x, _) = lon_lat_to_web_mercator(180.0, 0.0);
        assert!((x - 20_037_508.342_789_244).abs() < 1e-3);

        let (x, y) = lon_lat_to_web_mercator(77.3, 27.48);
        let (lon, lat) = web_mercator_to_lon_lat(x, y);
        assert!((lon - 77.3).abs() < 1e-9);
        assert!((lat - 27.48).abs() < 1e-9);
    }

    #[test]
    fn test_fit_zoom() {
        // Whole world fits at zoom 0
        assert_eq!(fit_zoom(&Bounds::new(-180.0, -90.0, 180.0, 90.0)), 0);
        // One degree: 360 / 1 = 2^8.49
        assert_eq!(fit_zoom(&Bounds::new(77.0, 27.0, 78.0, 28.0)), 8);
        // Degenerate extents zoom all the way in
        assert_eq!(fit_zoom(&Bounds::new(77.0, 27.0, 77.0, 27.0)), MAX_FIT_ZOOM);
        // Tiny extents are clamped
        assert_eq!(fit_zoom(&Bounds::new(77.0, 27.0, 77.000001, 27.000001)), MAX_FIT_ZOOM);
    }

    #[test]
    fn test_validate_center() {
        assert!(validate_center([27.48, 77.3]).is_ok());
        assert!(validate_center([91.0, 0.0]).is_err());
        assert!(validate_center([f64::NAN, 0.0]).is_err());
    }
}
