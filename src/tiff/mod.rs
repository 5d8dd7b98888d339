//! TIFF and GeoTIFF file format support
//!
//! Reading handles classic TIFF and BigTIFF in either byte order, with
//! stripped or tiled layout. Writing produces single-band little-endian
//! GeoTIFFs with GDAL metadata.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod writer;
pub mod image_data;
pub mod geokeys;
pub mod metadata;
pub(crate) mod predictor;
pub(crate) mod constants;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use writer::{ImageDescription, TiffWriter};
