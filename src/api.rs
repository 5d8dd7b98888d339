use std::path::{Path, PathBuf};

use log::{error, info};

use crate::config::PipelineConfig;
use crate::errors::{Outcome, PipelineError, PipelineResult};
use crate::mosaic::{composite_start_days, CompositeAverager, DayId, MosaicBuilder, ProductLayout, Reprojector};
use crate::raster::{GeoTiffDriver, NearestNeighbourWarper};

/// Results of processing many days
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    /// Days with nothing to process
    pub empty: Vec<DayId>,
    pub failed: Vec<(DayId, String)>,
}

impl BatchReport {
    fn record(&mut self, day: DayId, result: PipelineResult<Outcome>) {
        match result {
            Ok(Outcome::Written(path)) => self.written.push(path),
            Ok(Outcome::NoInput) => self.empty.push(day),
            Err(e) => {
                error!("{}: {}", day, e);
                self.failed.push((day, e.to_string()));
            },
        }
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.empty.len() + self.failed.len()
    }

    /// `Err` when any day failed
    pub fn into_result(self) -> PipelineResult<BatchReport> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(PipelineError::BatchFailed { failed: self.failed.len(), total: self.total() })
        }
    }
}

/// Main interface to the snowmosaic library
///
/// Bundles a configuration with the GeoTIFF backend for one product tree.
pub struct SnowMosaic {
    config: PipelineConfig,
    driver: GeoTiffDriver,
    warper: NearestNeighbourWarper,
    root: PathBuf,
}

impl SnowMosaic {
    pub fn new(config: PipelineConfig, root: &Path) -> PipelineResult<Self> {
        let driver = GeoTiffDriver::new(&config.compression, config.source_crs)?;
        Ok(SnowMosaic { config, driver, warper: NearestNeighbourWarper::new(), root: root.to_path_buf() })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn mosaic_builder(&self) -> MosaicBuilder<'_> {
        let reprojector = self.config.output_crs.map(|crs| Reprojector::new(&self.warper, crs));
        MosaicBuilder::new(&self.config, &self.driver, &self.driver, reprojector, &self.root)
    }

    fn composite_averager(&self) -> CompositeAverager<'_> {
        CompositeAverager::new(&self.config, &self.driver, &self.driver, &self.root)
    }

    /// Build the mosaic of one day
    pub fn mosaic_day(&self, type_name: &str, day: DayId) -> PipelineResult<Outcome> {
        let source_type = self.config.source_type(type_name)?;
        self.mosaic_builder().build(source_type, day)
    }

    /// Build the mosaic of every day folder of a year
    pub fn mosaic_year(&self, type_name: &str, year: i32) -> PipelineResult<BatchReport> {
        let source_type = self.config.source_type(type_name)?;
        let days = ProductLayout::new(&self.root, source_type, self.config.output_suffixes()).day_folders(year)?;
        info!("Mosaicking {} days of {} in {}", days.len(), type_name, year);

        let builder = self.mosaic_builder();
        let mut report = BatchReport::default();
        for day in days {
            report.record(day, builder.build(source_type, day));
        }
        Ok(report)
    }

    /// Build the composite whose window starts on `start`
    pub fn composite(&self, type_name: &str, start: DayId) -> PipelineResult<Outcome> {
        let source_type = self.config.source_type(type_name)?;
        self.composite_averager().build(source_type, start)
    }

    /// Build every composite window of a year
    pub fn composite_year(&self, type_name: &str, year: i32) -> PipelineResult<BatchReport> {
        let source_type = self.config.source_type(type_name)?;
        let start_days = composite_start_days(year, self.config.composite_days);
        info!("Building {} composites of {} in {}", start_days.len(), type_name, year);

        let averager = self.composite_averager();
        let mut report = BatchReport::default();
        for start in start_days {
            let start = DayId::new(year, start);
            report.record(start, averager.build(source_type, start));
        }
        Ok(report)
    }
}
