//! Daily mosaics and multi-day composites of tiled snow products

mod builder;
mod composite;
mod layout;
mod reproject;
pub mod schedule;
mod source_type;
mod tile;

pub use builder::MosaicBuilder;
pub use composite::{masked_mean, CompositeAverager, MeanAccumulator};
pub use layout::{DayId, ProductLayout};
pub use reproject::Reprojector;
pub use schedule::composite_start_days;
pub use source_type::{FilterLimits, SourceType};
pub use tile::TileSource;
