//! Compression codecs for TIFF strip and tile data
//!
//! Each codec is a `CompressionHandler`; `CompressionFactory` maps TIFF
//! compression codes and configuration names to handlers.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
