//! Daily mosaics
//!
//! All tiles of a day are pasted into one raster covering their union.
//! Tiles are processed in file-name order and later tiles overwrite earlier
//! ones where they overlap. Samples outside the source type's limits become
//! the no-data sentinel before pasting, and pixels no tile covers keep it.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::coordinate::GeoGrid;
use crate::errors::{Outcome, PipelineError, PipelineResult};
use crate::mosaic::{DayId, ProductLayout, Reprojector, SourceType, TileSource};
use crate::raster::{Band, RasterReader, RasterWriter};
use crate::utils::progress::ProgressTracker;

/// Builds the daily mosaic of one source type
pub struct MosaicBuilder<'a> {
    config: &'a PipelineConfig,
    reader: &'a dyn RasterReader,
    writer: &'a dyn RasterWriter,
    reprojector: Option<Reprojector<'a>>,
    root: PathBuf,
}

impl<'a> MosaicBuilder<'a> {
    /// A builder for the product tree below `root`
    ///
    /// Without a reprojector mosaics stay in the tiles' coordinate system.
    pub fn new(
        config: &'a PipelineConfig,
        reader: &'a dyn RasterReader,
        writer: &'a dyn RasterWriter,
        reprojector: Option<Reprojector<'a>>,
        root: &Path,
    ) -> Self {
        MosaicBuilder { config, reader, writer, reprojector, root: root.to_path_buf() }
    }

    /// Build the mosaic of `day`, written next to its tiles
    pub fn build(&self, source_type: &SourceType, day: DayId) -> PipelineResult<Outcome> {
        let layout = ProductLayout::new(&self.root, source_type, self.config.output_suffixes());
        let tiles = layout.tiles(day)?;
        if tiles.is_empty() {
            info!("No {} tiles for {} in {}", source_type.name, day, layout.day_folder(day).display());
            return Ok(Outcome::NoInput);
        }

        self.build_from_tiles(&tiles, source_type, &layout.mosaic_path(day))
    }

    /// Mosaic an explicit list of tiles into `output`
    pub fn build_from_tiles(&self, tiles: &[PathBuf], source_type: &SourceType, output: &Path) -> PipelineResult<Outcome> {
        if tiles.is_empty() {
            return Ok(Outcome::NoInput);
        }

        let mut ordered = tiles.to_vec();
        ordered.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut sources = self.open_tiles(&ordered, source_type)?;
        let grid = Self::mosaic_grid(&sources)?;
        info!("Mosaicking {} tiles of {} into {}", sources.len(), source_type.name, grid);

        let nodata = self.config.nodata;
        let mut mosaic = Band::filled(grid.x_size, grid.y_size, nodata);

        let progress = ProgressTracker::new(sources.len() as u64, &format!("Mosaicking {}", source_type.name));
        let mut copied = 0;
        let mut last_error = None;
        for source in sources.iter_mut() {
            progress.set_message(&source.path().display().to_string());
            match source.copy_into(&mut mosaic, &grid) {
                Ok(true) => copied += 1,
                Ok(false) => warn!("{} lies outside the mosaic extent", source.path().display()),
                // Headers can parse while the pixel data is truncated or corrupt
                Err(error @ PipelineError::UnreadableRaster { .. }) => {
                    warn!("Skipping tile: {}", error);
                    last_error = Some(error);
                },
                Err(error) => return Err(error),
            }
            source.release();
            progress.increment(1);
        }
        progress.finish();

        if copied == 0 {
            if let Some(error) = last_error {
                return Err(error);
            }
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut dataset = self.writer.create_raster(output, &grid, 1, self.config.data_type)?;
        dataset.set_band_metadata(1, source_type.band_metadata());
        self.writer.write_band(&mut dataset, 1, mosaic, Some(nodata))?;

        let dataset = match &self.reprojector {
            Some(reprojector) => reprojector.reproject(dataset)?,
            None => dataset,
        };

        let path = self.writer.close(dataset)?;
        info!("Wrote mosaic {}", path.display());
        Ok(Outcome::Written(path))
    }

    /// Open every readable tile; unreadable ones are skipped with a warning
    fn open_tiles(&self, tiles: &[PathBuf], source_type: &SourceType) -> PipelineResult<Vec<TileSource<'a>>> {
        let mut sources = Vec::with_capacity(tiles.len());
        let mut last_error = None;

        for path in tiles {
            match TileSource::open(self.reader, path, source_type.limits, self.config.nodata) {
                Ok(source) => sources.push(source),
                Err(error @ PipelineError::UnreadableRaster { .. }) => {
                    warn!("Skipping tile: {}", error);
                    last_error = Some(error);
                },
                Err(error) => return Err(error),
            }
        }

        if sources.is_empty() {
            return Err(last_error.unwrap_or_else(|| PipelineError::unreadable(&tiles[0], "no tile could be opened")));
        }

        debug!("{} of {} tiles opened", sources.len(), tiles.len());
        Ok(sources)
    }

    /// Union of the tile grids at the first tile's pixel size
    fn mosaic_grid(sources: &[TileSource<'_>]) -> PipelineResult<GeoGrid> {
        let first = sources[0].grid();
        for source in &sources[1..] {
            if !source.grid().same_pixel_size(first) {
                return Err(PipelineError::IncompatibleGeometry(format!(
                    "{} has pixel size {} x {}, expected {} x {}",
                    source.path().display(),
                    source.grid().pixel_width, source.grid().pixel_height,
                    first.pixel_width, first.pixel_height)));
            }
            if source.grid().crs != first.crs {
                return Err(PipelineError::IncompatibleGeometry(format!(
                    "{} is in {}, expected {}", source.path().display(), source.grid().crs, first.crs)));
            }
        }

        GeoGrid::union(sources.iter().map(TileSource::grid))
            .ok_or_else(|| PipelineError::IncompatibleGeometry("tiles cover no area".to_string()))
    }
}
