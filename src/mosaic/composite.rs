//! Multi-day composites of daily mosaics
//!
//! Each output pixel is the mean of the days on which it holds data. Days
//! without a mosaic are skipped; a pixel with no data on any day becomes
//! no-data. The first mosaic found is the template for the output grid,
//! sample type and metadata, and every other mosaic must match it.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::PipelineConfig;
use crate::errors::{Outcome, PipelineError, PipelineResult};
use crate::mosaic::schedule::window_days;
use crate::mosaic::{DayId, ProductLayout, SourceType};
use crate::raster::{Band, RasterInfo, RasterReader, RasterWriter};

fn is_nodata(value: f64, nodata: f64) -> bool {
    value == nodata || (nodata.is_nan() && value.is_nan())
}

fn same_nodata(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
        (None, None) => true,
        _ => false,
    }
}

/// Running per-pixel sums and valid-day counts
pub struct MeanAccumulator {
    sums: Vec<f64>,
    counts: Vec<u32>,
    nodata: f64,
}

impl MeanAccumulator {
    pub fn new(len: usize, nodata: f64) -> Self {
        MeanAccumulator { sums: vec![0.0; len], counts: vec![0; len], nodata }
    }

    /// Add one day; samples equal to the no-data value are ignored
    pub fn add(&mut self, values: &[f64]) {
        for ((sum, count), value) in self.sums.iter_mut().zip(self.counts.iter_mut()).zip(values) {
            if !is_nodata(*value, self.nodata) {
                *sum += value;
                *count += 1;
            }
        }
    }

    pub fn finish(self) -> Vec<f64> {
        let nodata = self.nodata;
        self.sums.into_iter()
            .zip(self.counts)
            .map(|(sum, count)| if count == 0 { nodata } else { sum / count as f64 })
            .collect()
    }
}

/// Per-pixel mean over `stack`, ignoring `nodata` samples
pub fn masked_mean(stack: &[&[f64]], nodata: f64) -> Vec<f64> {
    let len = stack.first().map_or(0, |values| values.len());
    let mut accumulator = MeanAccumulator::new(len, nodata);
    for values in stack {
        accumulator.add(values);
    }
    accumulator.finish()
}

/// Averages the daily mosaics of a composite window
pub struct CompositeAverager<'a> {
    config: &'a PipelineConfig,
    reader: &'a dyn RasterReader,
    writer: &'a dyn RasterWriter,
    root: PathBuf,
}

impl<'a> CompositeAverager<'a> {
    pub fn new(config: &'a PipelineConfig, reader: &'a dyn RasterReader, writer: &'a dyn RasterWriter, root: &Path) -> Self {
        CompositeAverager { config, reader, writer, root: root.to_path_buf() }
    }

    /// Composite of the window starting on `start`, written to the composites folder
    pub fn build(&self, source_type: &SourceType, start: DayId) -> PipelineResult<Outcome> {
        let layout = ProductLayout::new(&self.root, source_type, self.config.output_suffixes());
        let days = self.config.composite_days;

        let inputs: Vec<PathBuf> = window_days(start, days)
            .map(|day| layout.mosaic_path(day))
            .collect();

        self.average(&inputs, &layout.composite_path(start, days))
    }

    /// Average the existing files among `inputs` into `output`
    pub fn average(&self, inputs: &[PathBuf], output: &Path) -> PipelineResult<Outcome> {
        let found: Vec<&PathBuf> = inputs.iter()
            .filter(|path| {
                let exists = path.is_file();
                if !exists {
                    debug!("No mosaic at {}", path.display());
                }
                exists
            })
            .collect();

        let Some(template_path) = found.first() else {
            info!("No daily mosaics for {}", output.display());
            return Ok(Outcome::NoInput);
        };

        let template = self.read_info(template_path)?;
        let nodata = template.nodata.unwrap_or(self.config.nodata);
        let mut accumulator = MeanAccumulator::new(template.grid.pixel_count(), nodata);

        for path in &found {
            let info = self.read_info(path)?;
            if !info.grid.same_geometry(&template.grid) || info.grid.crs != template.grid.crs {
                return Err(PipelineError::IncompatibleGeometry(format!(
                    "{} has grid {}, expected {}", path.display(), info.grid, template.grid)));
            }
            if !same_nodata(info.nodata, template.nodata) {
                return Err(PipelineError::IncompatibleGeometry(format!(
                    "{} has no-data value {:?}, expected {:?}", path.display(), info.nodata, template.nodata)));
            }

            let band = self.reader.read_band(path, 1)
                .map_err(|e| PipelineError::unreadable(path.as_path(), e))?;
            accumulator.add(&band.data);
        }

        info!("Averaging {} of {} days into {}", found.len(), inputs.len(), output.display());

        let metadata = self.reader.read_metadata(template_path)
            .map_err(|e| PipelineError::unreadable(template_path.as_path(), e))?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let grid = template.grid;
        let mut dataset = self.writer.create_raster(output, &grid, 1, template.data_type)?;
        dataset.metadata = metadata;
        self.writer.write_band(&mut dataset, 1, Band::new(grid.x_size, grid.y_size, accumulator.finish()), Some(nodata))?;

        let path = self.writer.close(dataset)?;
        info!("Wrote composite {}", path.display());
        Ok(Outcome::Written(path))
    }

    fn read_info(&self, path: &Path) -> PipelineResult<RasterInfo> {
        let info = self.reader.read_raster(path)
            .map_err(|e| PipelineError::unreadable(path, e))?;
        if info.band_count != 1 {
            return Err(PipelineError::unreadable(path, format!("expected a single band, found {}", info.band_count)));
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nodata() {
        let day1 = [10.0, -999.0, -999.0, 3.0];
        let day2 = [20.0, 5.0, -999.0, 4.0];
        let day3 = [30.0, -999.0, -999.0, 8.0];
        let mean = masked_mean(&[&day1[..], &day2[..], &day3[..]], -999.0);
        assert_eq!(mean, vec![20.0, 5.0, -999.0, 5.0]);
    }

    #[test]
    fn nan_nodata_is_masked() {
        let day1 = [f64::NAN, 2.0];
        let day2 = [f64::NAN, 4.0];
        let mean = masked_mean(&[&day1[..], &day2[..]], f64::NAN);
        assert!(mean[0].is_nan());
        assert_eq!(mean[1], 3.0);
    }

    #[test]
    fn empty_stack() {
        assert!(masked_mean(&[], -999.0).is_empty());
    }

    #[test]
    fn nodata_comparison() {
        assert!(same_nodata(Some(-999.0), Some(-999.0)));
        assert!(same_nodata(Some(f64::NAN), Some(f64::NAN)));
        assert!(same_nodata(None, None));
        assert!(!same_nodata(Some(-999.0), None));
        assert!(!same_nodata(Some(-999.0), Some(0.0)));
    }
}
