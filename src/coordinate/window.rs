//! Pixel window arithmetic between grids sharing a pixel size
//!
//! World-space intersections are converted to pixel windows with GDAL's
//! rounding: offsets are floored after a small 0.1 nudge, sizes are
//! rounded half-up. Empty windows are `None`.

use super::grid::GeoGrid;

/// Orientation of a grid's rows, from the sign of its pixel height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxis {
    /// Negative pixel height, first row at the top
    NorthUp,
    /// Positive pixel height, first row at the bottom
    SouthUp,
}

impl YAxis {
    pub fn from_pixel_height(pixel_height: f64) -> Self {
        if pixel_height < 0.0 { YAxis::NorthUp } else { YAxis::SouthUp }
    }

    /// Upper edge of the overlap of two row ranges
    pub fn inner_upper(&self, a: f64, b: f64) -> f64 {
        match self {
            YAxis::NorthUp => a.min(b),
            YAxis::SouthUp => a.max(b),
        }
    }

    /// Lower edge of the overlap of two row ranges
    pub fn inner_lower(&self, a: f64, b: f64) -> f64 {
        match self {
            YAxis::NorthUp => a.max(b),
            YAxis::SouthUp => a.min(b),
        }
    }

    /// Upper edge of the union of two row ranges
    pub fn outer_upper(&self, a: f64, b: f64) -> f64 {
        self.inner_lower(a, b)
    }

    /// Lower edge of the union of two row ranges
    pub fn outer_lower(&self, a: f64, b: f64) -> f64 {
        self.inner_upper(a, b)
    }
}

/// World-space rectangle given by its upper-left and lower-right corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub ulx: f64,
    pub uly: f64,
    pub lrx: f64,
    pub lry: f64,
}

/// Rectangle of pixels within a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x_off: usize,
    pub y_off: usize,
    pub x_size: usize,
    pub y_size: usize,
}

impl PixelWindow {
    /// Window as large as both inputs allow, anchored at each one's offset
    pub fn common_size(&self, other: &PixelWindow) -> (usize, usize) {
        (self.x_size.min(other.x_size), self.y_size.min(other.y_size))
    }
}

/// Overlap of two grids in world coordinates
///
/// The result may be inverted when the grids do not touch; `to_pixel_window`
/// turns that into an empty window.
pub fn intersection_bounds(dest: &GeoGrid, src: &GeoGrid) -> Bounds {
    let axis = YAxis::from_pixel_height(dest.pixel_height);
    let (dest_lrx, dest_lry) = dest.lower_right();
    let (src_lrx, src_lry) = src.lower_right();

    Bounds {
        ulx: dest.origin_x.max(src.origin_x),
        uly: axis.inner_upper(dest.origin_y, src.origin_y),
        lrx: dest_lrx.min(src_lrx),
        lry: axis.inner_lower(dest_lry, src_lry),
    }
}

/// Convert world bounds to a pixel window of `grid`, clamped to its extent
pub fn to_pixel_window(grid: &GeoGrid, bounds: &Bounds) -> Option<PixelWindow> {
    let x_off = ((bounds.ulx - grid.origin_x) / grid.pixel_width + 0.1).floor() as i64;
    let y_off = ((bounds.uly - grid.origin_y) / grid.pixel_height + 0.1).floor() as i64;
    let x_end = ((bounds.lrx - grid.origin_x) / grid.pixel_width + 0.5).floor() as i64;
    let y_end = ((bounds.lry - grid.origin_y) / grid.pixel_height + 0.5).floor() as i64;

    let (x_off, x_size) = clamp_axis(x_off, x_end - x_off, grid.x_size as i64)?;
    let (y_off, y_size) = clamp_axis(y_off, y_end - y_off, grid.y_size as i64)?;

    Some(PixelWindow { x_off, y_off, x_size, y_size })
}

fn clamp_axis(offset: i64, size: i64, extent: i64) -> Option<(usize, usize)> {
    let start = offset.max(0);
    let end = (offset + size).min(extent);
    if end - start < 1 {
        return None;
    }
    Some((start as usize, (end - start) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::CoordinateSystem;

    fn grid(origin_x: f64, origin_y: f64, x_size: usize, y_size: usize) -> GeoGrid {
        GeoGrid::new(origin_x, origin_y, 1.0, -1.0, x_size, y_size, CoordinateSystem::ModisSinusoidal)
    }

    #[test]
    fn intersection_is_symmetric() {
        let a = grid(0.0, 6.0, 9, 6);
        let b = grid(6.0, 3.0, 3, 3);
        assert_eq!(intersection_bounds(&a, &b), intersection_bounds(&b, &a));
        assert_eq!(intersection_bounds(&a, &b), Bounds { ulx: 6.0, uly: 3.0, lrx: 9.0, lry: 0.0 });
    }

    #[test]
    fn windows_in_both_grids() {
        let mosaic = grid(0.0, 6.0, 9, 6);
        let tile = grid(6.0, 3.0, 3, 3);
        let bounds = intersection_bounds(&mosaic, &tile);

        assert_eq!(to_pixel_window(&mosaic, &bounds), Some(PixelWindow { x_off: 6, y_off: 3, x_size: 3, y_size: 3 }));
        assert_eq!(to_pixel_window(&tile, &bounds), Some(PixelWindow { x_off: 0, y_off: 0, x_size: 3, y_size: 3 }));
    }

    #[test]
    fn disjoint_grids_have_no_window() {
        let a = grid(0.0, 3.0, 3, 3);
        let b = grid(10.0, 3.0, 3, 3);
        let bounds = intersection_bounds(&a, &b);
        assert_eq!(to_pixel_window(&a, &bounds), None);
        assert_eq!(to_pixel_window(&b, &bounds), None);

        // Touching edges share no pixel either
        let c = grid(3.0, 3.0, 3, 3);
        assert_eq!(to_pixel_window(&a, &intersection_bounds(&a, &c)), None);
    }

    #[test]
    fn windows_are_clamped_to_the_grid() {
        let small = grid(0.0, 3.0, 3, 3);
        let bounds = Bounds { ulx: -2.0, uly: 5.0, lrx: 10.0, lry: -4.0 };
        assert_eq!(to_pixel_window(&small, &bounds), Some(PixelWindow { x_off: 0, y_off: 0, x_size: 3, y_size: 3 }));
    }

    #[test]
    fn sub_pixel_misalignment_rounds() {
        let mosaic = grid(0.0, 6.0, 9, 6);
        // A tile shifted by a floating point hair still lands on column 3
        let tile = grid(2.9999999, 6.0, 3, 3);
        let window = to_pixel_window(&mosaic, &intersection_bounds(&mosaic, &tile)).unwrap();
        assert_eq!((window.x_off, window.x_size), (3, 3));
    }

    #[test]
    fn south_up_grids_intersect() {
        let a = GeoGrid::new(0.0, 0.0, 1.0, 1.0, 4, 4, CoordinateSystem::WGS84);
        let b = GeoGrid::new(2.0, 2.0, 1.0, 1.0, 4, 4, CoordinateSystem::WGS84);
        let bounds = intersection_bounds(&a, &b);
        assert_eq!(bounds, Bounds { ulx: 2.0, uly: 2.0, lrx: 4.0, lry: 4.0 });
        assert_eq!(to_pixel_window(&a, &bounds), Some(PixelWindow { x_off: 2, y_off: 2, x_size: 2, y_size: 2 }));
        assert_eq!(to_pixel_window(&b, &bounds), Some(PixelWindow { x_off: 0, y_off: 0, x_size: 2, y_size: 2 }));
    }
}
