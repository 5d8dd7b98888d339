//! Factory for compression handlers

use crate::tiff::errors::{TiffError, TiffResult};
use super::deflate::AdobeDeflateHandler;
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::zstd::ZstdHandler;

/// Creates compression handlers from tag codes or configuration names
pub struct CompressionFactory;

impl CompressionFactory {
    /// Handler for the value of a Compression tag
    pub fn create_handler(compression: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match compression {
            1 => Ok(Box::new(UncompressedHandler)),
            // 32946 is the pre-standard Deflate code still written by old tools
            8 | 32946 => Ok(Box::new(AdobeDeflateHandler::new())),
            14 => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::UnsupportedCompression(compression)),
        }
    }

    /// Handler for a name such as `deflate` or `zstd`
    pub fn get_handler_by_name(name: &str) -> TiffResult<Box<dyn CompressionHandler>> {
        match name.trim().to_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Box::new(UncompressedHandler)),
            "deflate" | "zip" | "adobe deflate" => Ok(Box::new(AdobeDeflateHandler::new())),
            "zstd" => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::GenericError(format!("Unknown compression type: {}", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_names_agree() {
        for name in ["none", "deflate", "zstd"] {
            let by_name = CompressionFactory::get_handler_by_name(name).unwrap();
            let by_code = CompressionFactory::create_handler(by_name.code()).unwrap();
            assert_eq!(by_name.name(), by_code.name());
        }
        assert!(CompressionFactory::create_handler(5).is_err());
        assert!(CompressionFactory::get_handler_by_name("lzw").is_err());
    }

    #[test]
    fn compressed_chunks_decode_to_the_input() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 7) as u8).collect();
        for code in [1, 8, 14] {
            let handler = CompressionFactory::create_handler(code).unwrap();
            let packed = handler.compress(&data).unwrap();
            assert_eq!(handler.decompress(&packed).unwrap(), data, "{}", handler.name());
        }
    }
}
