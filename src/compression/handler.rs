//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for one TIFF compression method
///
/// Handlers are shared between the reader and the writer, so they carry no
/// per-file state.
pub trait CompressionHandler: Send + Sync {
    /// Decode one strip or tile
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Encode one strip or tile
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Human readable name, used in log messages
    fn name(&self) -> &'static str;

    /// Value of the TIFF Compression tag
    fn code(&self) -> u64;
}
