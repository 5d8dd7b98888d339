//! Byte order strategies
//!
//! A file's byte order is detected once from its header; every later read of
//! header words, tag values and pixel samples goes through the matching
//! `ByteOrderHandler`.

use byteorder::{BigEndian, ByteOrder as Endianness, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::io::seekable::SeekableReader;
use crate::raster::DataType;
use crate::tiff::errors::{TiffError, TiffResult};

/// Byte order marker of a TIFF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// `II`
    LittleEndian,
    /// `MM`
    BigEndian,
}

impl ByteOrder {
    /// Read the two marker bytes at the current position
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian),
            0x4D4D => Ok(ByteOrder::BigEndian),
            _ => Err(TiffError::InvalidByteOrder(marker)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian (II)",
            ByteOrder::BigEndian => "big-endian (MM)",
        }
    }

    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Reads numbers in one byte order
pub trait ByteOrderHandler: Send + Sync {
    fn byte_order(&self) -> ByteOrder;

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32>;

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    /// Decode packed pixel samples, appending them to `out`
    ///
    /// Trailing bytes that do not form a whole sample are ignored.
    fn decode_samples(&self, bytes: &[u8], data_type: DataType, out: &mut Vec<f64>);
}

fn decode_with<B: Endianness>(bytes: &[u8], data_type: DataType, out: &mut Vec<f64>) {
    let size = data_type.size_bytes();
    out.reserve(bytes.len() / size);

    out.extend(bytes.chunks_exact(size).map(|sample| match data_type {
        DataType::Byte => sample[0] as f64,
        DataType::Int8 => sample[0] as i8 as f64,
        DataType::UInt16 => B::read_u16(sample) as f64,
        DataType::Int16 => B::read_i16(sample) as f64,
        DataType::UInt32 => B::read_u32(sample) as f64,
        DataType::Int32 => B::read_i32(sample) as f64,
        DataType::Float32 => B::read_f32(sample) as f64,
        DataType::Float64 => B::read_f64(sample),
    }));
}

macro_rules! byte_order_handler {
    ($handler:ident, $order:ident) => {
        pub struct $handler;

        impl ByteOrderHandler for $handler {
            fn byte_order(&self) -> ByteOrder {
                ByteOrder::$order
            }

            fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
                reader.read_u16::<$order>()
            }

            fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
                reader.read_u32::<$order>()
            }

            fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
                reader.read_u64::<$order>()
            }

            fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32> {
                reader.read_f32::<$order>()
            }

            fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
                reader.read_f64::<$order>()
            }

            fn decode_samples(&self, bytes: &[u8], data_type: DataType, out: &mut Vec<f64>) {
                decode_with::<$order>(bytes, data_type, out)
            }
        }
    };
}

byte_order_handler!(LittleEndianHandler, LittleEndian);
byte_order_handler!(BigEndianHandler, BigEndian);
