//! Pixel sample types

use std::fmt;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// Numeric type of a raster band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Byte,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl DataType {
    /// Map the BitsPerSample / SampleFormat tag pair onto a data type
    pub fn from_tiff(bits: u16, format: u16) -> TiffResult<Self> {
        match (bits, format) {
            (8, sample_format::UNSIGNED) => Ok(DataType::Byte),
            (8, sample_format::SIGNED) => Ok(DataType::Int8),
            (16, sample_format::UNSIGNED) => Ok(DataType::UInt16),
            (16, sample_format::SIGNED) => Ok(DataType::Int16),
            (32, sample_format::UNSIGNED) => Ok(DataType::UInt32),
            (32, sample_format::SIGNED) => Ok(DataType::Int32),
            (32, sample_format::IEEEFP) => Ok(DataType::Float32),
            (64, sample_format::IEEEFP) => Ok(DataType::Float64),
            _ => Err(TiffError::UnsupportedSampleFormat { bits, format }),
        }
    }

    /// Parse a configuration name such as `int16` or `float32`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "byte" | "uint8" => Some(DataType::Byte),
            "int8" => Some(DataType::Int8),
            "uint16" => Some(DataType::UInt16),
            "int16" => Some(DataType::Int16),
            "uint32" => Some(DataType::UInt32),
            "int32" => Some(DataType::Int32),
            "float32" => Some(DataType::Float32),
            "float64" => Some(DataType::Float64),
            _ => None,
        }
    }

    pub fn bits(&self) -> u16 {
        (self.size_bytes() * 8) as u16
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            DataType::Byte | DataType::Int8 => 1,
            DataType::UInt16 | DataType::Int16 => 2,
            DataType::UInt32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::Float64 => 8,
        }
    }

    pub fn sample_format(&self) -> u16 {
        match self {
            DataType::Byte | DataType::UInt16 | DataType::UInt32 => sample_format::UNSIGNED,
            DataType::Int8 | DataType::Int16 | DataType::Int32 => sample_format::SIGNED,
            DataType::Float32 | DataType::Float64 => sample_format::IEEEFP,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, DataType::Float32 | DataType::Float64)
    }

    fn range(&self) -> (f64, f64) {
        match self {
            DataType::Byte => (u8::MIN as f64, u8::MAX as f64),
            DataType::Int8 => (i8::MIN as f64, i8::MAX as f64),
            DataType::UInt16 => (u16::MIN as f64, u16::MAX as f64),
            DataType::Int16 => (i16::MIN as f64, i16::MAX as f64),
            DataType::UInt32 => (u32::MIN as f64, u32::MAX as f64),
            DataType::Int32 => (i32::MIN as f64, i32::MAX as f64),
            DataType::Float32 => (f32::MIN as f64, f32::MAX as f64),
            DataType::Float64 => (f64::MIN, f64::MAX),
        }
    }

    /// Bring a value into this type's domain
    ///
    /// Integer types round half away from zero and saturate at their range,
    /// NaN becomes zero. Float types pass through (Float32 loses precision).
    pub fn convert(&self, value: f64) -> f64 {
        match self {
            DataType::Float64 => value,
            DataType::Float32 => value as f32 as f64,
            _ => {
                if value.is_nan() {
                    return 0.0;
                }
                let (min, max) = self.range();
                value.round().clamp(min, max)
            }
        }
    }

    /// Append `value` to `out` as a little-endian sample of this type
    pub fn write_sample<W: Write>(&self, out: &mut W, value: f64) -> std::io::Result<()> {
        let value = self.convert(value);
        match self {
            DataType::Byte => out.write_u8(value as u8),
            DataType::Int8 => out.write_i8(value as i8),
            DataType::UInt16 => out.write_u16::<LittleEndian>(value as u16),
            DataType::Int16 => out.write_i16::<LittleEndian>(value as i16),
            DataType::UInt32 => out.write_u32::<LittleEndian>(value as u32),
            DataType::Int32 => out.write_i32::<LittleEndian>(value as i32),
            DataType::Float32 => out.write_f32::<LittleEndian>(value as f32),
            DataType::Float64 => out.write_f64::<LittleEndian>(value),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Byte => "Byte",
            DataType::Int8 => "Int8",
            DataType::UInt16 => "UInt16",
            DataType::Int16 => "Int16",
            DataType::UInt32 => "UInt32",
            DataType::Int32 => "Int32",
            DataType::Float32 => "Float32",
            DataType::Float64 => "Float64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_conversion_rounds_and_saturates() {
        assert_eq!(DataType::Int16.convert(12.5), 13.0);
        assert_eq!(DataType::Int16.convert(-12.5), -13.0);
        assert_eq!(DataType::Int16.convert(40000.0), 32767.0);
        assert_eq!(DataType::Byte.convert(-3.0), 0.0);
        assert_eq!(DataType::Int32.convert(f64::NAN), 0.0);
    }

    #[test]
    fn float_conversion_keeps_fraction() {
        assert_eq!(DataType::Float64.convert(0.25), 0.25);
        assert_eq!(DataType::Float32.convert(0.5), 0.5);
    }

    #[test]
    fn tiff_codes_map_to_types() {
        assert_eq!(DataType::from_tiff(16, 2).unwrap(), DataType::Int16);
        assert_eq!(DataType::from_tiff(32, 3).unwrap(), DataType::Float32);
        assert!(DataType::from_tiff(12, 1).is_err());
        assert_eq!(DataType::Int16.bits(), 16);
        assert_eq!(DataType::Int16.sample_format(), 2);
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(DataType::from_name("Int16"), Some(DataType::Int16));
        assert_eq!(DataType::from_name("FLOAT32"), Some(DataType::Float32));
        assert_eq!(DataType::from_name("complex"), None);
    }
}
