//! Pipeline configuration
//!
//! The built-in defaults live in `snowmosaic.toml` at the crate root and are
//! compiled into the binary. A file passed on the command line replaces them
//! as a whole.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::debug;

use crate::coordinate::{CoordinateSystem, CoordinateSystemFactory};
use crate::errors::{PipelineError, PipelineResult};
use crate::mosaic::{FilterLimits, SourceType};
use crate::raster::DataType;

lazy_static! {
    static ref DEFAULT_CONFIG: PipelineResult<PipelineConfig> =
        PipelineConfig::from_str(include_str!("../snowmosaic.toml"));
}

/// Settings shared by the mosaic and composite builders
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Sentinel written for filtered and uncovered pixels
    pub nodata: f64,
    /// Sample type of written mosaics
    pub data_type: DataType,
    /// Compression name for written files
    pub compression: String,
    /// CRS assumed for tiles without GeoKeys
    pub source_crs: CoordinateSystem,
    /// CRS daily mosaics are warped into, `None` to keep the tiles' CRS
    pub output_crs: Option<CoordinateSystem>,
    /// Composite window length in days
    pub composite_days: usize,
    /// Source types by name
    pub types: BTreeMap<String, SourceType>,
}

fn config_error(message: impl Into<String>) -> PipelineError {
    PipelineError::Config(message.into())
}

fn get_table<'a>(value: &'a toml::Value, name: &str) -> PipelineResult<&'a toml::value::Table> {
    value.get(name)
        .and_then(|v| v.as_table())
        .ok_or_else(|| config_error(format!("missing [{}] table", name)))
}

fn get_str<'a>(table: &'a toml::value::Table, section: &str, key: &str) -> PipelineResult<&'a str> {
    table.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| config_error(format!("{}.{} must be a string", section, key)))
}

/// Numbers may be written as integers or floats
fn get_number(table: &toml::value::Table, section: &str, key: &str) -> PipelineResult<f64> {
    match table.get(key) {
        Some(toml::Value::Float(value)) => Ok(*value),
        Some(toml::Value::Integer(value)) => Ok(*value as f64),
        _ => Err(config_error(format!("{}.{} must be a number", section, key))),
    }
}

impl PipelineConfig {
    /// Built-in configuration
    pub fn builtin() -> PipelineResult<Self> {
        match &*DEFAULT_CONFIG {
            Ok(config) => Ok(config.clone()),
            Err(e) => Err(config_error(format!("built-in configuration: {}", e))),
        }
    }

    /// Configuration from a TOML file
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("cannot read {}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_str(&content)
    }

    /// Configuration from TOML text
    pub fn from_str(content: &str) -> PipelineResult<Self> {
        let value: toml::Value = content.parse()
            .map_err(|e| config_error(format!("failed to parse TOML: {}", e)))?;

        let raster = get_table(&value, "raster")?;
        let nodata = get_number(raster, "raster", "nodata")?;
        let type_name = get_str(raster, "raster", "data_type")?;
        let data_type = DataType::from_name(type_name)
            .ok_or_else(|| config_error(format!("unknown data type '{}'", type_name)))?;
        let compression = get_str(raster, "raster", "compression")?.to_string();

        let projection = get_table(&value, "projection")?;
        let source_crs = CoordinateSystemFactory::from_string(get_str(projection, "projection", "source")?)
            .map_err(|e| config_error(e.to_string()))?;
        let output_crs = match projection.get("output_epsg") {
            None => None,
            Some(toml::Value::Integer(code)) if *code > 0 => Some(CoordinateSystemFactory::from_epsg(*code as u32)),
            Some(other) => return Err(config_error(format!("projection.output_epsg must be a positive integer, got {}", other))),
        };

        let composite = get_table(&value, "composite")?;
        let composite_days = match composite.get("days") {
            Some(toml::Value::Integer(days)) if *days >= 2 => *days as usize,
            _ => return Err(config_error("composite.days must be an integer of at least 2")),
        };

        let mut types = BTreeMap::new();
        for (name, entry) in get_table(&value, "types")? {
            let section = format!("types.{}", name);
            let table = entry.as_table()
                .ok_or_else(|| config_error(format!("[{}] must be a table", section)))?;

            let limits = FilterLimits::new(
                get_number(table, &section, "lower")?,
                get_number(table, &section, "upper")?,
            ).ok_or_else(|| config_error(format!("{}: lower limit above upper limit", section)))?;

            types.insert(name.clone(), SourceType {
                name: name.clone(),
                folder: get_str(table, &section, "folder")?.to_string(),
                suffix: get_str(table, &section, "suffix")?.to_string(),
                limits,
                description: get_str(table, &section, "description")?.to_string(),
                unit: get_str(table, &section, "unit")?.to_string(),
            });
        }

        if types.is_empty() {
            return Err(config_error("no source types configured"));
        }

        Ok(PipelineConfig { nodata, data_type, compression, source_crs, output_crs, composite_days, types })
    }

    /// Source type by name
    pub fn source_type(&self, name: &str) -> PipelineResult<&SourceType> {
        self.types.get(name).ok_or_else(|| config_error(format!(
            "unknown source type '{}' (configured: {})",
            name, self.types.keys().cloned().collect::<Vec<_>>().join(", "))))
    }

    /// Suffixes of every product this pipeline writes
    pub fn output_suffixes(&self) -> Vec<String> {
        self.types.values().map(|source_type| source_type.suffix.clone()).collect()
    }
}
