//! Capabilities the pipeline needs from a raster backend
//!
//! Band indices are 1-based, as in GDAL.

use std::path::{Path, PathBuf};

use crate::coordinate::{CoordinateSystem, GeoGrid};
use crate::raster::{Band, DataType, RasterDataset, RasterInfo};
use crate::tiff::errors::TiffResult;
use crate::tiff::metadata::GdalMetadata;

/// Read access to georeferenced rasters
pub trait RasterReader {
    /// Geometry, band count, type and no-data value of a file
    fn read_raster(&self, path: &Path) -> TiffResult<RasterInfo>;

    /// Samples of one band
    fn read_band(&self, path: &Path, band_index: usize) -> TiffResult<Band>;

    /// Dataset and band metadata items
    fn read_metadata(&self, path: &Path) -> TiffResult<GdalMetadata>;
}

/// Write access to georeferenced rasters
pub trait RasterWriter {
    fn create_raster(&self, path: &Path, grid: &GeoGrid, band_count: usize, data_type: DataType) -> TiffResult<RasterDataset>;

    fn write_band(&self, dataset: &mut RasterDataset, band_index: usize, band: Band, nodata: Option<f64>) -> TiffResult<()>;

    /// Flush the dataset to its path
    fn close(&self, dataset: RasterDataset) -> TiffResult<PathBuf>;
}

/// Resampling methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    NearestNeighbour,
}

/// Resampling of a raster into another coordinate system
pub trait Warper {
    fn warp(&self, source: &RasterDataset, target_crs: &CoordinateSystem, resampling: Resampling) -> TiffResult<RasterDataset>;
}
