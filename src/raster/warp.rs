//! Nearest-neighbour reprojection
//!
//! The output grid follows GDAL's suggested-output rule: the extent is the
//! bounding box of points sampled along the source edges, and the square
//! pixel size keeps the diagonal pixel count of the source.

use log::{debug, info};

use crate::coordinate::{BoundingBox, CoordinateSystem, CoordinateTransformer, GeoGrid};
use crate::raster::{Band, RasterDataset, Resampling, Warper};
use crate::tiff::errors::{TiffError, TiffResult};

/// Points sampled per source edge when estimating the output extent
const EDGE_SAMPLES: usize = 21;

/// Warps rasters between the coordinate systems `CoordinateTransformer` supports
pub struct NearestNeighbourWarper {
    transformer: CoordinateTransformer,
}

impl Default for NearestNeighbourWarper {
    fn default() -> Self {
        Self::new()
    }
}

impl NearestNeighbourWarper {
    pub fn new() -> Self {
        NearestNeighbourWarper { transformer: CoordinateTransformer }
    }

    /// Grid a raster on `source` takes when warped to `target_crs`
    pub fn suggested_grid(&self, source: &GeoGrid, target_crs: &CoordinateSystem) -> TiffResult<GeoGrid> {
        let mut extent = BoundingBox::empty();
        let last = (EDGE_SAMPLES - 1) as f64;
        let (columns, rows) = (source.x_size as f64, source.y_size as f64);

        for step in 0..EDGE_SAMPLES {
            let t = step as f64 / last;
            let edge_points = [
                source.pixel_to_world(t * columns, 0.0),
                source.pixel_to_world(t * columns, rows),
                source.pixel_to_world(0.0, t * rows),
                source.pixel_to_world(columns, t * rows),
            ];
            for point in &edge_points {
                if let Some(target) = self.transformer.transform_point(point, &source.crs, target_crs)? {
                    extent.expand_to(&target);
                }
            }
        }

        if extent.is_empty() || extent.width() <= 0.0 || extent.height() <= 0.0 {
            return Err(TiffError::UnsupportedTransform(format!(
                "{} has no extent in {}", source, target_crs)));
        }

        let source_diagonal = (columns * columns + rows * rows).sqrt();
        let target_diagonal = (extent.width() * extent.width() + extent.height() * extent.height()).sqrt();
        let resolution = target_diagonal / source_diagonal;

        let x_size = ((extent.width() / resolution + 0.5).floor() as usize).max(1);
        let y_size = ((extent.height() / resolution + 0.5).floor() as usize).max(1);

        Ok(GeoGrid::new(extent.min_x, extent.max_y, resolution, -resolution, x_size, y_size, *target_crs))
    }

    fn resample_band(&self, band: &Band, source: &GeoGrid, target: &GeoGrid, fill: f64) -> TiffResult<Band> {
        let mut output = Band::filled(target.x_size, target.y_size, fill);

        for row in 0..target.y_size {
            for column in 0..target.x_size {
                let centre = target.pixel_to_world(column as f64 + 0.5, row as f64 + 0.5);
                let Some(position) = self.transformer.transform_point(&centre, &target.crs, &source.crs)? else {
                    continue;
                };

                let (source_column, source_row) = source.world_to_pixel(&position);
                if source_column < 0.0 || source_row < 0.0 {
                    continue;
                }
                let (source_column, source_row) = (source_column.floor() as usize, source_row.floor() as usize);
                if source_column >= band.width || source_row >= band.height {
                    continue;
                }

                output.set(column, row, band.get(source_column, source_row));
            }
        }

        Ok(output)
    }
}

impl Warper for NearestNeighbourWarper {
    fn warp(&self, source: &RasterDataset, target_crs: &CoordinateSystem, resampling: Resampling) -> TiffResult<RasterDataset> {
        match resampling {
            Resampling::NearestNeighbour => {},
        }

        if source.grid.crs == *target_crs {
            debug!("{} already in {}, nothing to warp", source.path.display(), target_crs);
            return Ok(source.clone());
        }

        let target_grid = self.suggested_grid(&source.grid, target_crs)?;
        info!("Warping {} from {} to {}", source.path.display(), source.grid, target_grid);

        let fill = source.nodata.unwrap_or(0.0);
        let mut warped = RasterDataset::new(source.path.clone(), target_grid, source.band_count(), source.data_type);
        warped.nodata = source.nodata;
        warped.metadata = source.metadata.clone();

        for (index, band) in source.bands.iter().enumerate() {
            if let Some(band) = band {
                warped.bands[index] = Some(self.resample_band(band, &source.grid, &target_grid, fill)?);
            }
        }

        Ok(warped)
    }
}
