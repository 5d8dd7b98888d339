//! Placement of a raster in world coordinates

use std::fmt;

use super::crs::CoordinateSystem;
use super::point::Point;
use super::window::{Bounds, YAxis};

/// Origin, pixel size, extent and CRS of a raster
///
/// The origin is the outer corner of the first pixel. For north-up rasters
/// `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoGrid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub x_size: usize,
    pub y_size: usize,
    pub crs: CoordinateSystem,
}

impl GeoGrid {
    pub fn new(
        origin_x: f64,
        origin_y: f64,
        pixel_width: f64,
        pixel_height: f64,
        x_size: usize,
        y_size: usize,
        crs: CoordinateSystem,
    ) -> Self {
        GeoGrid { origin_x, origin_y, pixel_width, pixel_height, x_size, y_size, crs }
    }

    /// Grid from a GDAL style `[origin_x, pixel_width, 0, origin_y, 0, pixel_height]`
    pub fn from_geotransform(geotransform: &[f64; 6], x_size: usize, y_size: usize, crs: CoordinateSystem) -> Self {
        GeoGrid::new(geotransform[0], geotransform[3], geotransform[1], geotransform[5], x_size, y_size, crs)
    }

    pub fn geotransform(&self) -> [f64; 6] {
        [self.origin_x, self.pixel_width, 0.0, self.origin_y, 0.0, self.pixel_height]
    }

    /// Corner opposite the origin
    pub fn lower_right(&self) -> (f64, f64) {
        (
            self.origin_x + self.pixel_width * self.x_size as f64,
            self.origin_y + self.pixel_height * self.y_size as f64,
        )
    }

    pub fn y_axis(&self) -> YAxis {
        YAxis::from_pixel_height(self.pixel_height)
    }

    pub fn pixel_count(&self) -> usize {
        self.x_size * self.y_size
    }

    pub fn bounds(&self) -> Bounds {
        let (lrx, lry) = self.lower_right();
        Bounds { ulx: self.origin_x, uly: self.origin_y, lrx, lry }
    }

    /// Whether both grids use the same pixel size, within a relative tolerance
    pub fn same_pixel_size(&self, other: &GeoGrid) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * a.abs().max(b.abs());
        close(self.pixel_width, other.pixel_width) && close(self.pixel_height, other.pixel_height)
    }

    /// Same placement and size, ignoring rounding noise in the origin
    pub fn same_geometry(&self, other: &GeoGrid) -> bool {
        let tolerance = self.pixel_width.abs() * 1e-6;
        self.x_size == other.x_size
            && self.y_size == other.y_size
            && self.same_pixel_size(other)
            && (self.origin_x - other.origin_x).abs() <= tolerance
            && (self.origin_y - other.origin_y).abs() <= tolerance
    }

    /// World coordinates of a (fractional) pixel position
    pub fn pixel_to_world(&self, column: f64, row: f64) -> Point {
        Point::new(self.origin_x + column * self.pixel_width, self.origin_y + row * self.pixel_height)
    }

    /// Fractional pixel position of a world coordinate
    pub fn world_to_pixel(&self, point: &Point) -> (f64, f64) {
        ((point.x - self.origin_x) / self.pixel_width, (point.y - self.origin_y) / self.pixel_height)
    }

    /// Smallest grid covering all of `grids`, with the first grid's pixel size
    ///
    /// Sizes are rounded half-up from the union extent.
    pub fn union<'a>(grids: impl IntoIterator<Item = &'a GeoGrid>) -> Option<GeoGrid> {
        let mut grids = grids.into_iter();
        let first = grids.next()?;
        let axis = first.y_axis();
        let mut bounds = first.bounds();

        for grid in grids {
            let other = grid.bounds();
            bounds.ulx = bounds.ulx.min(other.ulx);
            bounds.lrx = bounds.lrx.max(other.lrx);
            bounds.uly = axis.outer_upper(bounds.uly, other.uly);
            bounds.lry = axis.outer_lower(bounds.lry, other.lry);
        }

        let x_size = ((bounds.lrx - bounds.ulx) / first.pixel_width + 0.5).floor().max(0.0) as usize;
        let y_size = ((bounds.lry - bounds.uly) / first.pixel_height + 0.5).floor().max(0.0) as usize;

        Some(GeoGrid::new(bounds.ulx, bounds.uly, first.pixel_width, first.pixel_height, x_size, y_size, first.crs))
    }
}

impl fmt::Display for GeoGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {}), pixel {} x {}, {}",
               self.x_size, self.y_size, self.origin_x, self.origin_y,
               self.pixel_width, self.pixel_height, self.crs)
    }
}
