//! Coordinate transformation functionality
//!
//! Every supported system converts to and from WGS84, and transforms
//! between two projected systems pass through WGS84. Points outside a
//! projection's domain transform to `None`.

use std::f64::consts::PI;

use super::crs::CoordinateSystem;
use super::point::Point;
use crate::tiff::errors::{TiffError, TiffResult};

/// Radius of the sphere the MODIS sinusoidal grid is defined on, in meters
pub const MODIS_SPHERE_RADIUS: f64 = 6371007.181;

/// Transformer for converting between coordinate systems
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    /// WGS84 semi-major axis, used by Web Mercator
    const EARTH_RADIUS: f64 = 6378137.0;

    /// Convert from WGS84 (EPSG:4326) to Web Mercator (EPSG:3857)
    pub fn wgs84_to_web_mercator(&self, lon: f64, lat: f64) -> Point {
        // Web Mercator is undefined at the poles
        let lat = lat.clamp(-85.05, 85.05);

        let x = lon * Self::EARTH_RADIUS * PI / 180.0;
        let y = f64::ln(f64::tan((90.0 + lat) * PI / 360.0)) * Self::EARTH_RADIUS;

        Point::new(x, y)
    }

    /// Convert from Web Mercator (EPSG:3857) to WGS84 (EPSG:4326)
    pub fn web_mercator_to_wgs84(&self, x: f64, y: f64) -> Point {
        let lon = x * 180.0 / (Self::EARTH_RADIUS * PI);
        let lat = 180.0 / PI * (2.0 * f64::atan(f64::exp(y / Self::EARTH_RADIUS)) - PI / 2.0);

        Point::new(lon, lat)
    }

    /// Convert from WGS84 to MODIS sinusoidal meters
    pub fn wgs84_to_sinusoidal(&self, lon: f64, lat: f64) -> Point {
        let lat_rad = lat.to_radians();
        let x = MODIS_SPHERE_RADIUS * lon.to_radians() * lat_rad.cos();
        let y = MODIS_SPHERE_RADIUS * lat_rad;

        Point::new(x, y)
    }

    /// Convert from MODIS sinusoidal meters to WGS84
    ///
    /// Returns `None` for points outside the projected globe.
    pub fn sinusoidal_to_wgs84(&self, x: f64, y: f64) -> Option<Point> {
        let lat_rad = y / MODIS_SPHERE_RADIUS;
        if lat_rad.abs() > PI / 2.0 {
            return None;
        }

        let cos_lat = lat_rad.cos();
        if cos_lat.abs() < 1e-12 {
            return if x.abs() < 1e-6 { Some(Point::new(0.0, lat_rad.to_degrees())) } else { None };
        }

        let lon_rad = x / (MODIS_SPHERE_RADIUS * cos_lat);
        if lon_rad.abs() > PI + 1e-12 {
            return None;
        }

        Some(Point::new(lon_rad.to_degrees(), lat_rad.to_degrees()))
    }

    /// Whether `transform_point` can convert between the two systems
    pub fn supports(&self, from_crs: &CoordinateSystem, to_crs: &CoordinateSystem) -> bool {
        from_crs == to_crs || (Self::has_wgs84_path(from_crs) && Self::has_wgs84_path(to_crs))
    }

    fn has_wgs84_path(crs: &CoordinateSystem) -> bool {
        matches!(crs, CoordinateSystem::WGS84 | CoordinateSystem::WebMercator | CoordinateSystem::ModisSinusoidal)
    }

    fn to_wgs84(&self, point: &Point, crs: &CoordinateSystem) -> Option<Point> {
        match crs {
            CoordinateSystem::WebMercator => Some(self.web_mercator_to_wgs84(point.x, point.y)),
            CoordinateSystem::ModisSinusoidal => self.sinusoidal_to_wgs84(point.x, point.y),
            _ => Some(*point),
        }
    }

    fn from_wgs84(&self, point: &Point, crs: &CoordinateSystem) -> Option<Point> {
        if point.x.abs() > 180.0 || point.y.abs() > 90.0 {
            return None;
        }
        match crs {
            CoordinateSystem::WebMercator => Some(self.wgs84_to_web_mercator(point.x, point.y)),
            CoordinateSystem::ModisSinusoidal => Some(self.wgs84_to_sinusoidal(point.x, point.y)),
            _ => Some(*point),
        }
    }

    /// Transform a point between coordinate systems
    ///
    /// Fails for unsupported pairs; `Ok(None)` means the point lies outside
    /// the domain of one of the projections.
    pub fn transform_point(&self, point: &Point, from_crs: &CoordinateSystem, to_crs: &CoordinateSystem) -> TiffResult<Option<Point>> {
        if from_crs == to_crs {
            return Ok(Some(*point));
        }
        if !self.supports(from_crs, to_crs) {
            return Err(TiffError::UnsupportedTransform(format!(
                "from {} to {}", from_crs.description(), to_crs.description())));
        }

        Ok(self.to_wgs84(point, from_crs).and_then(|geographic| self.from_wgs84(&geographic, to_crs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!((actual - expected).abs() <= tolerance, "{} != {}", actual, expected);
    }

    #[test]
    fn sinusoidal_matches_modis_tile_corner() {
        // Upper-left corner of MODIS tile h18v03 lies at 60N
        let transformer = CoordinateTransformer;
        let point = transformer.wgs84_to_sinusoidal(0.0, 60.0);
        assert_close(point.x, 0.0, 1e-9);
        assert_close(point.y, 6671703.1186, 1e-3);

        let back = transformer.sinusoidal_to_wgs84(1111950.5197, 5559752.5984).unwrap();
        assert_close(back.y, 50.0, 1e-6);
        assert_close(back.x, 10.0 / 50f64.to_radians().cos(), 1e-6);
    }

    #[test]
    fn outside_the_sinusoidal_globe_is_none() {
        let transformer = CoordinateTransformer;
        // 60N is half as wide as the equator
        assert!(transformer.sinusoidal_to_wgs84(15_000_000.0, 6671703.118).is_none());
        assert!(transformer.sinusoidal_to_wgs84(0.0, 11_000_000.0).is_none());
    }

    #[test]
    fn transforms_through_wgs84() {
        let transformer = CoordinateTransformer;
        let origin = Point::new(1_000_000.0, 5_000_000.0);

        let mercator = transformer
            .transform_point(&origin, &CoordinateSystem::ModisSinusoidal, &CoordinateSystem::WebMercator)
            .unwrap()
            .unwrap();
        let back = transformer
            .transform_point(&mercator, &CoordinateSystem::WebMercator, &CoordinateSystem::ModisSinusoidal)
            .unwrap()
            .unwrap();

        assert_close(back.x, origin.x, 1e-3);
        assert_close(back.y, origin.y, 1e-3);
    }

    #[test]
    fn unsupported_pairs_fail() {
        let transformer = CoordinateTransformer;
        let result = transformer.transform_point(
            &Point::new(0.0, 0.0), &CoordinateSystem::UTM(33, true), &CoordinateSystem::WGS84);
        assert!(result.is_err());
    }
}
