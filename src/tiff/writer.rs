//! Single-band GeoTIFF writer
//!
//! Produces one little-endian IFD with the image in compressed strips,
//! followed by the georeferencing and GDAL tags. Layout is computed up
//! front: header, IFD, out-of-line tag values, then strip data. Files
//! whose strips would not be addressable with 32-bit offsets are written
//! as BigTIFF.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};

use crate::compression::CompressionHandler;
use crate::coordinate::CoordinateSystem;
use crate::raster::DataType;
use crate::tiff::constants::{field_types, header, photometric, planar_config, predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geokeys::{self, GeoKeyDirectory};
use crate::tiff::metadata::{self, GdalMetadata};
use crate::tiff::predictor::apply_horizontal_differencing;

/// Uncompressed size aimed for per strip
const TARGET_STRIP_BYTES: usize = 256 * 1024;

/// Everything about a raster except its pixels
pub struct ImageDescription<'a> {
    pub width: usize,
    pub height: usize,
    pub data_type: DataType,
    pub geotransform: [f64; 6],
    pub crs: &'a CoordinateSystem,
    pub nodata: Option<f64>,
    pub metadata: &'a GdalMetadata,
}

/// One tag with its little-endian encoded values
struct TagData {
    tag: u16,
    field_type: u16,
    count: u64,
    bytes: Vec<u8>,
}

impl TagData {
    fn shorts(tag: u16, values: &[u16]) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * 2);
        for value in values {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        TagData { tag, field_type: field_types::SHORT, count: values.len() as u64, bytes }
    }

    fn long(tag: u16, value: u32) -> Self {
        TagData { tag, field_type: field_types::LONG, count: 1, bytes: value.to_le_bytes().to_vec() }
    }

    fn doubles(tag: u16, values: &[f64]) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for value in values {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        TagData { tag, field_type: field_types::DOUBLE, count: values.len() as u64, bytes }
    }

    fn ascii(tag: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        TagData { tag, field_type: field_types::ASCII, count: bytes.len() as u64, bytes }
    }

    /// Offsets or byte counts, as LONG or LONG8 depending on the format
    fn offsets(tag: u16, values: &[u64], is_big_tiff: bool) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for value in values {
            if is_big_tiff {
                bytes.extend_from_slice(&value.to_le_bytes());
            } else {
                bytes.extend_from_slice(&(*value as u32).to_le_bytes());
            }
        }
        let field_type = if is_big_tiff { field_types::LONG8 } else { field_types::LONG };
        TagData { tag, field_type, count: values.len() as u64, bytes }
    }
}

fn align_to_word(offset: u64) -> u64 {
    offset + (offset % 2)
}

/// Writes GeoTIFF files with a fixed compression method
pub struct TiffWriter {
    compression: Box<dyn CompressionHandler>,
}

impl TiffWriter {
    pub fn new(compression: Box<dyn CompressionHandler>) -> Self {
        TiffWriter { compression }
    }

    /// Write `samples` (row-major, one band) to `path`
    pub fn write(&self, path: &Path, image: &ImageDescription, samples: &[f64]) -> TiffResult<()> {
        if image.width == 0 || image.height == 0 {
            return Err(TiffError::MissingDimensions);
        }
        if samples.len() != image.width * image.height {
            return Err(TiffError::GenericError(format!(
                "Expected {} samples for a {}x{} image, got {}",
                image.width * image.height, image.width, image.height, samples.len())));
        }

        let use_predictor = image.data_type.is_integer() && self.compression.code() != 1;
        let (rows_per_strip, strips) = self.encode_strips(image, samples, use_predictor)?;
        let strip_counts: Vec<u64> = strips.iter().map(|strip| strip.len() as u64).collect();
        let strip_total: u64 = strip_counts.iter().sum();

        // Out-of-line values stay small, so the strip payload decides the format
        let is_big_tiff = strip_total + (1 << 20) > u32::MAX as u64;
        let mut tag_list = self.build_tags(image, rows_per_strip, use_predictor, &strip_counts, is_big_tiff)?;
        tag_list.sort_by_key(|tag| tag.tag);

        let header_size: u64 = if is_big_tiff { 16 } else { 8 };
        let inline_size: usize = if is_big_tiff { 8 } else { 4 };
        let entry_count = tag_list.len() as u64;
        let ifd_size = if is_big_tiff { 8 + 20 * entry_count + 8 } else { 2 + 12 * entry_count + 4 };

        // Assign offsets to out-of-line tag values
        let mut current_offset = header_size + ifd_size;
        let mut value_offsets = BTreeMap::new();
        for tag in &tag_list {
            if tag.bytes.len() > inline_size {
                current_offset = align_to_word(current_offset);
                value_offsets.insert(tag.tag, current_offset);
                current_offset += tag.bytes.len() as u64;
            }
        }

        let mut strip_offsets = Vec::with_capacity(strips.len());
        current_offset = align_to_word(current_offset);
        for count in &strip_counts {
            strip_offsets.push(current_offset);
            current_offset += count;
        }

        if let Some(tag) = tag_list.iter_mut().find(|tag| tag.tag == tags::STRIP_OFFSETS) {
            *tag = TagData::offsets(tags::STRIP_OFFSETS, &strip_offsets, is_big_tiff);
        }

        info!("Writing {} ({}x{} {}, {} strips, {})",
              path.display(), image.width, image.height, image.data_type, strips.len(),
              if is_big_tiff { "BigTIFF" } else { "TIFF" });

        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);

        Self::write_header(&mut writer, is_big_tiff, header_size)?;
        Self::write_ifd(&mut writer, &tag_list, &value_offsets, is_big_tiff, inline_size)?;

        let mut position = header_size + ifd_size;
        for tag in &tag_list {
            if let Some(offset) = value_offsets.get(&tag.tag) {
                position = Self::pad_to(&mut writer, position, *offset)?;
                writer.write_all(&tag.bytes)?;
                position += tag.bytes.len() as u64;
            }
        }

        for (strip, offset) in strips.iter().zip(&strip_offsets) {
            position = Self::pad_to(&mut writer, position, *offset)?;
            writer.write_all(strip)?;
            position += strip.len() as u64;
        }

        writer.flush()?;
        debug!("Wrote {} bytes to {}", position, path.display());
        Ok(())
    }

    /// Encode and compress the image in strips of whole rows
    fn encode_strips(&self, image: &ImageDescription, samples: &[f64], use_predictor: bool) -> TiffResult<(usize, Vec<Vec<u8>>)> {
        let sample_size = image.data_type.size_bytes();
        let row_bytes = image.width * sample_size;
        let rows_per_strip = (TARGET_STRIP_BYTES / row_bytes.max(1)).clamp(1, image.height);

        let mut strips = Vec::with_capacity(image.height.div_ceil(rows_per_strip));
        for rows in samples.chunks(rows_per_strip * image.width) {
            let mut raw = Vec::with_capacity(rows.len() * sample_size);
            for value in rows {
                image.data_type.write_sample(&mut raw, *value)?;
            }
            if use_predictor {
                apply_horizontal_differencing(&mut raw, image.width, 1, sample_size);
            }
            strips.push(self.compression.compress(&raw)?);
        }

        Ok((rows_per_strip, strips))
    }

    fn build_tags(
        &self,
        image: &ImageDescription,
        rows_per_strip: usize,
        use_predictor: bool,
        strip_counts: &[u64],
        is_big_tiff: bool,
    ) -> TiffResult<Vec<TagData>> {
        let mut tag_list = vec![
            TagData::long(tags::IMAGE_WIDTH, image.width as u32),
            TagData::long(tags::IMAGE_LENGTH, image.height as u32),
            TagData::shorts(tags::BITS_PER_SAMPLE, &[image.data_type.bits()]),
            TagData::shorts(tags::COMPRESSION, &[self.compression.code() as u16]),
            TagData::shorts(tags::PHOTOMETRIC_INTERPRETATION, &[photometric::BLACK_IS_ZERO]),
            // Placeholder until the layout is known
            TagData::offsets(tags::STRIP_OFFSETS, &vec![0; strip_counts.len()], is_big_tiff),
            TagData::shorts(tags::SAMPLES_PER_PIXEL, &[1]),
            TagData::long(tags::ROWS_PER_STRIP, rows_per_strip as u32),
            TagData::offsets(tags::STRIP_BYTE_COUNTS, strip_counts, is_big_tiff),
            TagData::shorts(tags::PLANAR_CONFIGURATION, &[planar_config::CHUNKY]),
            TagData::shorts(tags::SAMPLE_FORMAT, &[image.data_type.sample_format()]),
        ];

        if use_predictor {
            tag_list.push(TagData::shorts(tags::PREDICTOR, &[predictor::HORIZONTAL_DIFFERENCING]));
        }

        let (scale, tiepoint) = geokeys::geotransform_tags(&image.geotransform);
        tag_list.push(TagData::doubles(tags::MODEL_PIXEL_SCALE_TAG, &scale));
        tag_list.push(TagData::doubles(tags::MODEL_TIEPOINT_TAG, &tiepoint));

        let directory = GeoKeyDirectory::for_coordinate_system(image.crs);
        tag_list.push(TagData::shorts(tags::GEO_KEY_DIRECTORY_TAG, &directory.to_shorts()));
        if !directory.doubles.is_empty() {
            tag_list.push(TagData::doubles(tags::GEO_DOUBLE_PARAMS_TAG, &directory.doubles));
        }
        if !directory.ascii.is_empty() {
            tag_list.push(TagData::ascii(tags::GEO_ASCII_PARAMS_TAG, &directory.ascii));
        }

        if !image.metadata.is_empty() {
            tag_list.push(TagData::ascii(tags::GDAL_METADATA, &metadata::to_xml(image.metadata)?));
        }
        if let Some(nodata) = image.nodata {
            tag_list.push(TagData::ascii(tags::GDAL_NODATA, &metadata::format_nodata(nodata)));
        }

        Ok(tag_list)
    }

    fn write_header(writer: &mut impl Write, is_big_tiff: bool, first_ifd_offset: u64) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_u16::<LittleEndian>(header::BIG_TIFF_VERSION)?;
            writer.write_u16::<LittleEndian>(header::BIGTIFF_OFFSET_SIZE)?;
            writer.write_u16::<LittleEndian>(0)?;
            writer.write_u64::<LittleEndian>(first_ifd_offset)?;
        } else {
            writer.write_u16::<LittleEndian>(header::TIFF_VERSION)?;
            writer.write_u32::<LittleEndian>(first_ifd_offset as u32)?;
        }

        Ok(())
    }

    fn write_ifd(
        writer: &mut impl Write,
        tag_list: &[TagData],
        value_offsets: &BTreeMap<u16, u64>,
        is_big_tiff: bool,
        inline_size: usize,
    ) -> TiffResult<()> {
        if is_big_tiff {
            writer.write_u64::<LittleEndian>(tag_list.len() as u64)?;
        } else {
            writer.write_u16::<LittleEndian>(tag_list.len() as u16)?;
        }

        for tag in tag_list {
            writer.write_u16::<LittleEndian>(tag.tag)?;
            writer.write_u16::<LittleEndian>(tag.field_type)?;
            if is_big_tiff {
                writer.write_u64::<LittleEndian>(tag.count)?;
            } else {
                writer.write_u32::<LittleEndian>(tag.count as u32)?;
            }

            match value_offsets.get(&tag.tag) {
                Some(offset) if is_big_tiff => writer.write_u64::<LittleEndian>(*offset)?,
                Some(offset) => writer.write_u32::<LittleEndian>(*offset as u32)?,
                None => {
                    let mut field = tag.bytes.clone();
                    field.resize(inline_size, 0);
                    writer.write_all(&field)?;
                }
            }
        }

        // No further IFDs
        if is_big_tiff {
            writer.write_u64::<LittleEndian>(0)?;
        } else {
            writer.write_u32::<LittleEndian>(0)?;
        }

        Ok(())
    }

    fn pad_to(writer: &mut impl Write, position: u64, target: u64) -> TiffResult<u64> {
        if target > position {
            writer.write_all(&vec![0u8; (target - position) as usize])?;
        }
        Ok(target.max(position))
    }
}
