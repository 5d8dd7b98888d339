//! Raster descriptions and open write handles

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::coordinate::GeoGrid;
use crate::raster::{Band, DataType};
use crate::tiff::metadata::GdalMetadata;

/// What `read_raster` reports about a file without reading its pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub grid: GeoGrid,
    pub band_count: usize,
    pub data_type: DataType,
    pub nodata: Option<f64>,
}

/// A raster being assembled in memory before it is written
///
/// Returned by `create_raster` and `warp`; nothing reaches the disk until
/// the handle is closed.
#[derive(Debug, Clone)]
pub struct RasterDataset {
    pub path: PathBuf,
    pub grid: GeoGrid,
    pub data_type: DataType,
    pub nodata: Option<f64>,
    pub bands: Vec<Option<Band>>,
    pub metadata: GdalMetadata,
}

impl RasterDataset {
    pub fn new(path: PathBuf, grid: GeoGrid, band_count: usize, data_type: DataType) -> Self {
        RasterDataset {
            path,
            grid,
            data_type,
            nodata: None,
            bands: vec![None; band_count],
            metadata: GdalMetadata::default(),
        }
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band by 1-based index, if it has been written
    pub fn band(&self, band_index: usize) -> Option<&Band> {
        band_index.checked_sub(1)
            .and_then(|index| self.bands.get(index))
            .and_then(Option::as_ref)
    }

    /// Replace the metadata items of a band (1-based)
    pub fn set_band_metadata(&mut self, band_index: usize, items: BTreeMap<String, String>) {
        self.metadata.bands.insert(band_index.saturating_sub(1), items);
    }

    pub fn band_metadata(&self, band_index: usize) -> BTreeMap<String, String> {
        self.metadata.band(band_index.saturating_sub(1))
    }
}
