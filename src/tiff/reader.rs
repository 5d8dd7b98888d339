//! TIFF file reader implementation
//!
//! Reads the header and IFD chain of TIFF/BigTIFF files in either byte order,
//! and decodes tag values whether they are stored inline in the entry or at
//! an offset elsewhere in the file.

use byteorder::ReadBytesExt;
use log::{debug, warn};
use std::io::{Cursor, SeekFrom};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;

/// Reasonable limit to prevent looping over a corrupt IFD chain
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
    /// Size of the source, used to reject offsets past its end
    file_size: u64,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
            file_size: u64::MAX,
        }
    }

    /// Returns the byte order handler once the header has been read
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Reads the header and IFD chain from the given reader
    ///
    /// # Arguments
    /// * `reader` - Any struct implementing the SeekableReader trait
    ///
    /// # Returns
    /// A TIFF structure with at least one IFD
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        self.byte_order_handler = Some(byte_order.create_handler());

        self.is_big_tiff = self.detect_tiff_format(reader)?;
        self.file_size = Self::file_size(reader)?;

        let first_ifd_offset = self.read_offset(reader)?;
        debug!("First IFD offset: {}", first_ifd_offset);
        if first_ifd_offset < 8 || first_ifd_offset >= self.file_size {
            return Err(TiffError::GenericError(format!(
                "Invalid IFD offset: {} (file size: {})", first_ifd_offset, self.file_size)));
        }

        let mut tiff = TIFF::new(self.is_big_tiff, byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset)?;

        debug!("Read {} IFDs", tiff.ifds.len());
        Ok(tiff)
    }

    /// Checks the version word and, for BigTIFF, the offset size and reserved word
    fn detect_tiff_format(&self, reader: &mut dyn SeekableReader) -> TiffResult<bool> {
        let handler = self.handler()?;
        let version = handler.read_u16(reader)?;

        match version {
            header::TIFF_VERSION => Ok(false),
            header::BIG_TIFF_VERSION => {
                let offset_size = handler.read_u16(reader)?;
                let reserved = handler.read_u16(reader)?;
                if offset_size != header::BIGTIFF_OFFSET_SIZE || reserved != 0 {
                    return Err(TiffError::InvalidBigTIFFHeader);
                }
                Ok(true)
            },
            _ => Err(TiffError::UnsupportedVersion(version)),
        }
    }

    fn file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let current_position = reader.stream_position()?;
        let size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(current_position))?;
        Ok(size)
    }

    /// Reads a 4 or 8 byte offset depending on the format
    fn read_offset(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u32(reader)? as u64)
        }
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link after the first IFD ends the chain with a warning rather
    /// than failing the read, since only the first image is ever used.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if !ifds.is_empty() => {
                    warn!("Error reading IFD {}: {}, stopping IFD chain", ifds.len(), e);
                    break;
                },
                Err(e) => return Err(e),
            };

            // The reader sits on the next-IFD offset right after the entries
            let next_ifd_offset = match self.read_offset(reader) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };
            ifds.push(ifd);

            if next_ifd_offset != 0 && (next_ifd_offset < 8 || next_ifd_offset >= self.file_size) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `offset` - Offset in the file where the IFD starts
    /// * `number` - The index of this IFD in the file
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if self.is_big_tiff {
            self.handler()?.read_u64(reader)?
        } else {
            self.handler()?.read_u16(reader)? as u64
        };
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry, keeping the raw value field
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let mut raw = vec![0u8; if self.is_big_tiff { 8 } else { 4 }];
        reader.read_exact(&mut raw)?;

        let mut entry = IFDEntry::new(tag, field_type, count, 0);
        let mut cursor = Cursor::new(raw.clone());
        entry.value_offset = if entry.is_value_inline(self.is_big_tiff) {
            match field_type {
                field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED | field_types::ASCII => raw[0] as u64,
                field_types::SHORT | field_types::SSHORT => handler.read_u16(&mut cursor)? as u64,
                field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(&mut cursor)?,
                _ => handler.read_u32(&mut cursor)? as u64,
            }
        } else if self.is_big_tiff {
            handler.read_u64(&mut cursor)?
        } else {
            handler.read_u32(&mut cursor)? as u64
        };
        entry.inline = raw;

        Ok(entry)
    }

    /// Positions a value source for `entry` and runs `read` on it
    ///
    /// Inline values are decoded from the entry's raw value field, everything
    /// else is read from the file at the entry's offset.
    fn with_values<T>(
        &self,
        reader: &mut dyn SeekableReader,
        entry: &IFDEntry,
        read: impl FnOnce(&mut dyn SeekableReader, &dyn ByteOrderHandler) -> TiffResult<T>,
    ) -> TiffResult<T> {
        let handler = self.handler()?;

        if entry.is_value_inline(self.is_big_tiff) {
            let mut cursor = Cursor::new(entry.inline.clone());
            return read(&mut cursor, handler);
        }

        if entry.value_offset.saturating_add(entry.value_size()) > self.file_size {
            return Err(TiffError::GenericError(format!(
                "Values of tag {} extend past the end of the file", entry.tag)));
        }
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        read(reader, handler)
    }

    /// Reads a tag's values as unsigned integers
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `ifd` - The IFD containing the tag
    /// * `tag` - The tag number to read
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;

        self.with_values(reader, entry, |source, handler| {
            let mut values = Vec::with_capacity(entry.count as usize);
            for _ in 0..entry.count {
                let value = match entry.field_type {
                    field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => source.read_u8()? as u64,
                    field_types::SHORT | field_types::SSHORT => handler.read_u16(source)? as u64,
                    field_types::LONG | field_types::SLONG => handler.read_u32(source)? as u64,
                    field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(source)?,
                    other => return Err(TiffError::UnsupportedFieldType(other)),
                };
                values.push(value);
            }
            Ok(values)
        })
    }

    /// Reads a tag's values as floating point numbers
    ///
    /// Integer and rational field types are converted, so this works for
    /// DOUBLE georeferencing tags as well as numeric tags written by
    /// less careful producers.
    pub fn read_tag_doubles(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;

        self.with_values(reader, entry, |source, handler| {
            let mut values = Vec::with_capacity(entry.count as usize);
            for _ in 0..entry.count {
                let value = match entry.field_type {
                    field_types::DOUBLE => handler.read_f64(source)?,
                    field_types::FLOAT => handler.read_f32(source)? as f64,
                    field_types::BYTE | field_types::UNDEFINED => source.read_u8()? as f64,
                    field_types::SBYTE => source.read_i8()? as f64,
                    field_types::SHORT => handler.read_u16(source)? as f64,
                    field_types::SSHORT => handler.read_u16(source)? as i16 as f64,
                    field_types::LONG => handler.read_u32(source)? as f64,
                    field_types::SLONG => handler.read_u32(source)? as i32 as f64,
                    field_types::RATIONAL => {
                        let numerator = handler.read_u32(source)? as f64;
                        let denominator = handler.read_u32(source)? as f64;
                        numerator / denominator
                    },
                    field_types::SRATIONAL => {
                        let numerator = handler.read_u32(source)? as i32 as f64;
                        let denominator = handler.read_u32(source)? as i32 as f64;
                        numerator / denominator
                    },
                    other => return Err(TiffError::UnsupportedFieldType(other)),
                };
                values.push(value);
            }
            Ok(values)
        })
    }

    /// Reads an ASCII tag, with trailing null characters removed
    pub fn read_tag_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;

        self.with_values(reader, entry, |source, _| {
            let mut buffer = vec![0u8; entry.count as usize];
            source.read_exact(&mut buffer)?;

            while buffer.last() == Some(&0) {
                buffer.pop();
            }

            Ok(String::from_utf8_lossy(&buffer).into_owned())
        })
    }

    /// Reads `length` raw bytes at `offset`
    pub fn read_bytes_at(&self, reader: &mut dyn SeekableReader, offset: u64, length: u64) -> TiffResult<Vec<u8>> {
        if offset.saturating_add(length) > self.file_size {
            return Err(TiffError::GenericError(format!(
                "Data block at {} (+{} bytes) extends past the end of the file", offset, length)));
        }

        reader.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; length as usize];
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}
