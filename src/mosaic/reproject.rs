//! Reprojection of finished mosaics into the output coordinate system

use log::debug;

use crate::coordinate::CoordinateSystem;
use crate::errors::PipelineResult;
use crate::raster::{RasterDataset, Resampling, Warper};

/// Warps datasets into one target CRS with nearest-neighbour resampling
pub struct Reprojector<'a> {
    warper: &'a dyn Warper,
    target: CoordinateSystem,
}

impl<'a> Reprojector<'a> {
    pub fn new(warper: &'a dyn Warper, target: CoordinateSystem) -> Self {
        Reprojector { warper, target }
    }

    /// The dataset on a grid in the target CRS
    ///
    /// Datasets already in the target CRS are passed through untouched.
    pub fn reproject(&self, dataset: RasterDataset) -> PipelineResult<RasterDataset> {
        if dataset.grid.crs == self.target {
            debug!("{} is already in {}", dataset.path.display(), self.target);
            return Ok(dataset);
        }

        Ok(self.warper.warp(&dataset, &self.target, Resampling::NearestNeighbour)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoGrid;
    use crate::raster::{Band, DataType, NearestNeighbourWarper};
    use crate::tiff::errors::TiffError;
    use crate::errors::PipelineError;
    use std::path::PathBuf;

    fn dataset(crs: CoordinateSystem) -> RasterDataset {
        let grid = GeoGrid::new(0.0, 2000.0, 1000.0, -1000.0, 2, 2, crs);
        let mut dataset = RasterDataset::new(PathBuf::from("2020001_rf.tif"), grid, 1, DataType::Int16);
        dataset.bands[0] = Some(Band::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]));
        dataset
    }

    #[test]
    fn matching_crs_passes_through() {
        let warper = NearestNeighbourWarper::new();
        let reprojector = Reprojector::new(&warper, CoordinateSystem::ModisSinusoidal);
        let source = dataset(CoordinateSystem::ModisSinusoidal);
        let output = reprojector.reproject(source.clone()).unwrap();
        assert_eq!(output.grid, source.grid);
        assert_eq!(output.bands, source.bands);
    }

    #[test]
    fn warps_into_target() {
        let warper = NearestNeighbourWarper::new();
        let reprojector = Reprojector::new(&warper, CoordinateSystem::WGS84);
        let output = reprojector.reproject(dataset(CoordinateSystem::ModisSinusoidal)).unwrap();
        assert_eq!(output.grid.crs, CoordinateSystem::WGS84);
        assert!(output.grid.pixel_width > 0.0 && output.grid.pixel_width < 0.1);
    }

    #[test]
    fn unsupported_pair_is_a_raster_error() {
        let warper = NearestNeighbourWarper::new();
        let reprojector = Reprojector::new(&warper, CoordinateSystem::UTM(32, true));
        let result = reprojector.reproject(dataset(CoordinateSystem::ModisSinusoidal));
        assert!(matches!(result, Err(PipelineError::Raster(TiffError::UnsupportedTransform(_)))));
    }
}
