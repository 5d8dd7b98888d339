//! Folder and file naming of the product tree
//!
//! ```text
//! <root>/<year>/<type folder>/<YYYYDDD>/*.tif            tiles
//! <root>/<year>/<type folder>/<YYYYDDD>/<YYYYDDD><suffix> daily mosaic
//! <root>/<year>/<type folder>/composites/<YYYYDDD>_<N>_days<suffix>
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::errors::{PipelineError, PipelineResult};
use crate::mosaic::SourceType;

lazy_static! {
    static ref DAY_FOLDER: Regex = Regex::new(r"^(\d{4})(\d{3})$").expect("valid day folder pattern");
}

const COMPOSITE_FOLDER: &str = "composites";

/// A day written as `YYYYDDD`
///
/// The day number is not checked against the length of the year: composite
/// windows may run past December 31st and simply find no files there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayId {
    pub year: i32,
    pub day: u32,
}

impl DayId {
    pub fn new(year: i32, day: u32) -> Self {
        DayId { year, day }
    }

    /// Parse a `YYYYDDD` string
    pub fn parse(text: &str) -> Option<Self> {
        let captures = DAY_FOLDER.captures(text.trim())?;
        let year = captures[1].parse().ok()?;
        let day = captures[2].parse().ok()?;
        if day == 0 {
            return None;
        }
        Some(DayId { year, day })
    }

    /// The day `offset` days later in the same numbering
    pub fn plus(&self, offset: u32) -> Self {
        DayId { year: self.year, day: self.day + offset }
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:03}", self.year, self.day)
    }
}

/// Paths of one source type's products below a root folder
pub struct ProductLayout<'a> {
    root: PathBuf,
    source_type: &'a SourceType,
    /// Suffixes of all products, which are never tiles
    output_suffixes: Vec<String>,
}

impl<'a> ProductLayout<'a> {
    pub fn new(root: &Path, source_type: &'a SourceType, output_suffixes: Vec<String>) -> Self {
        ProductLayout { root: root.to_path_buf(), source_type, output_suffixes }
    }

    /// `<root>/<year>/<type folder>`
    pub fn type_path(&self, year: i32) -> PathBuf {
        self.root.join(year.to_string()).join(&self.source_type.folder)
    }

    pub fn day_folder(&self, day: DayId) -> PathBuf {
        self.type_path(day.year).join(day.to_string())
    }

    pub fn mosaic_path(&self, day: DayId) -> PathBuf {
        self.day_folder(day).join(format!("{}{}", day, self.source_type.suffix))
    }

    pub fn composite_folder(&self, year: i32) -> PathBuf {
        self.type_path(year).join(COMPOSITE_FOLDER)
    }

    pub fn composite_path(&self, start: DayId, days: usize) -> PathBuf {
        self.composite_folder(start.year)
            .join(format!("{}_{}_days{}", start, days, self.source_type.suffix))
    }

    /// Day folders of a year, in day order
    pub fn day_folders(&self, year: i32) -> PipelineResult<Vec<DayId>> {
        let type_path = self.type_path(year);
        let entries = fs::read_dir(&type_path).map_err(|e| PipelineError::Config(format!(
            "cannot list {}: {}", type_path.display(), e)))?;

        let mut days = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            if let Some(day) = name.to_str().and_then(DayId::parse) {
                if day.year == year {
                    days.push(day);
                }
            }
        }

        days.sort();
        debug!("{}: {} day folders", type_path.display(), days.len());
        Ok(days)
    }

    /// Tile files of a day sorted by file name; empty when the folder is missing
    pub fn tiles(&self, day: DayId) -> PipelineResult<Vec<PathBuf>> {
        let folder = self.day_folder(day);
        if !folder.is_dir() {
            debug!("{} does not exist", folder.display());
            return Ok(Vec::new());
        }

        let mut tiles = Vec::new();
        for entry in fs::read_dir(&folder)? {
            let path = entry?.path();
            if path.is_file() && self.is_tile(&path) {
                tiles.push(path);
            }
        }

        tiles.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(tiles)
    }

    fn is_tile(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let is_tiff = path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("tif"));

        is_tiff && !self.output_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }
}
