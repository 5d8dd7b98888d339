//! One input tile of a daily mosaic

use std::path::{Path, PathBuf};

use log::debug;

use crate::coordinate::{intersection_bounds, to_pixel_window, GeoGrid};
use crate::errors::{PipelineError, PipelineResult};
use crate::mosaic::FilterLimits;
use crate::raster::{Band, RasterInfo, RasterReader};

/// A tile file bound to its grid, with its pixels read on demand
pub struct TileSource<'a> {
    path: PathBuf,
    info: RasterInfo,
    limits: FilterLimits,
    nodata: f64,
    reader: &'a dyn RasterReader,
    values: Option<Band>,
}

impl<'a> TileSource<'a> {
    /// Read the tile's geometry; pixels are left on disk
    pub fn open(reader: &'a dyn RasterReader, path: &Path, limits: FilterLimits, nodata: f64) -> PipelineResult<Self> {
        let info = reader.read_raster(path)
            .map_err(|e| PipelineError::unreadable(path, e))?;

        if info.band_count != 1 {
            return Err(PipelineError::unreadable(path, format!("expected a single band, found {}", info.band_count)));
        }

        debug!("Opened tile {}: {}", path.display(), info.grid);
        Ok(TileSource { path: path.to_path_buf(), info, limits, nodata, reader, values: None })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn grid(&self) -> &GeoGrid {
        &self.info.grid
    }

    /// The tile's samples with out-of-range values set to the sentinel
    pub fn filtered_values(&mut self) -> PipelineResult<&Band> {
        if self.values.is_none() {
            let mut band = self.reader.read_band(&self.path, 1)
                .map_err(|e| PipelineError::unreadable(&self.path, e))?;
            let replaced = self.limits.apply(&mut band.data, self.nodata);
            debug!("{}: {} of {} samples outside [{}, {}]",
                   self.path.display(), replaced, band.data.len(), self.limits.lower, self.limits.upper);
            self.values = Some(band);
        }

        self.values.as_ref().ok_or_else(|| PipelineError::unreadable(&self.path, "band not loaded"))
    }

    /// Copy the filtered samples into the mosaic where the grids overlap
    ///
    /// Returns whether anything was copied. No overlap is not an error.
    pub fn copy_into(&mut self, mosaic: &mut Band, mosaic_grid: &GeoGrid) -> PipelineResult<bool> {
        let bounds = intersection_bounds(mosaic_grid, &self.info.grid);
        let target_window = to_pixel_window(mosaic_grid, &bounds);
        let source_window = to_pixel_window(&self.info.grid, &bounds);

        let (Some(target_window), Some(source_window)) = (target_window, source_window) else {
            debug!("{} does not overlap the mosaic", self.path.display());
            return Ok(false);
        };

        let values = self.filtered_values()?;
        mosaic.paste(values, &source_window, &target_window);
        Ok(true)
    }

    /// Drop the pixel buffer
    pub fn release(&mut self) {
        self.values = None;
    }
}
