//! Raster data model and the GeoTIFF backend
//!
//! The pipeline talks to rasters through `RasterReader`, `RasterWriter` and
//! `Warper`. `GeoTiffDriver` implements the first two on top of the `tiff`
//! module and `NearestNeighbourWarper` the third.

mod band;
mod data_type;
mod dataset;
mod geotiff;
mod traits;
mod warp;

pub use band::Band;
pub use data_type::DataType;
pub use dataset::{RasterDataset, RasterInfo};
pub use geotiff::GeoTiffDriver;
pub use traits::{RasterReader, RasterWriter, Resampling, Warper};
pub use warp::NearestNeighbourWarper;
