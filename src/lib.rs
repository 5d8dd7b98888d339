pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod coordinate;
pub mod raster;
pub mod config;
pub mod errors;
pub mod mosaic;
pub mod commands;
pub mod api;

pub use crate::api::{BatchReport, SnowMosaic};

pub use config::PipelineConfig;
pub use errors::{Outcome, PipelineError, PipelineResult};
pub use mosaic::{CompositeAverager, DayId, MosaicBuilder, SourceType};
pub use coordinate::{BoundingBox, CoordinateSystem, GeoGrid, Point};
