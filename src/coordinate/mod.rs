//! Coordinate handling for geospatial data
//!
//! Grids, bounding boxes, pixel window arithmetic and transforms between
//! the supported coordinate systems.

mod bbox;
mod point;
mod transform;
mod crs;
mod grid;
pub mod window;

pub use self::bbox::BoundingBox;
pub use self::point::Point;
pub use self::transform::{CoordinateTransformer, MODIS_SPHERE_RADIUS};
pub use self::crs::{CoordinateSystem, CoordinateSystemFactory};
pub use self::grid::GeoGrid;
pub use self::window::{intersection_bounds, to_pixel_window, Bounds, PixelWindow, YAxis};
