//! Source product types and their valid value ranges

use std::collections::BTreeMap;

/// Inclusive range of valid sample values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterLimits {
    pub lower: f64,
    pub upper: f64,
}

impl FilterLimits {
    /// `None` when `lower` is above `upper` or either bound is NaN
    pub fn new(lower: f64, upper: f64) -> Option<Self> {
        if lower <= upper {
            Some(FilterLimits { lower, upper })
        } else {
            None
        }
    }

    /// Whether `value` lies within the limits; NaN never does
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Replace every sample outside the limits with `nodata`
    pub fn apply(&self, values: &mut [f64], nodata: f64) -> usize {
        let mut replaced = 0;
        for value in values.iter_mut() {
            if !self.contains(*value) {
                *value = nodata;
                replaced += 1;
            }
        }
        replaced
    }
}

/// One kind of input product, such as radiative forcing or snow fraction
#[derive(Debug, Clone, PartialEq)]
pub struct SourceType {
    /// Name used on the command line
    pub name: String,
    /// Folder below `<root>/<year>/` holding the day folders
    pub folder: String,
    /// Suffix of the daily mosaic file
    pub suffix: String,
    pub limits: FilterLimits,
    pub description: String,
    pub unit: String,
}

impl SourceType {
    /// GDAL band metadata items written into mosaics
    pub fn band_metadata(&self) -> BTreeMap<String, String> {
        let mut items = BTreeMap::new();
        items.insert("Description".to_string(), self.description.clone());
        items.insert("Unit".to_string(), self.unit.clone());
        items
    }
}
