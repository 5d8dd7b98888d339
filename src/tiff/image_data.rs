//! Pixel data decoding for stripped and tiled images
//!
//! A band is assembled chunk by chunk: each strip or tile is read,
//! decompressed, un-predicted and decoded to `f64` samples, then the
//! samples of the requested band are copied into place. Chunks on the right
//! and bottom edges are clipped to the image.

use log::debug;

use crate::compression::CompressionFactory;
use crate::io::seekable::SeekableReader;
use crate::raster::DataType;
use crate::tiff::constants::{planar_config, predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::predictor::undo_horizontal_differencing;
use crate::tiff::reader::TiffReader;

/// How the pixels of an image are organised in the file
#[derive(Debug, Clone)]
pub struct ImageLayout {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub data_type: DataType,
    pub compression: u64,
    pub predictor: u64,
    pub planar: u16,
    /// Width of one chunk; the image width for strips
    pub chunk_width: usize,
    /// Height of one chunk; RowsPerStrip for strips
    pub chunk_height: usize,
    pub tiled: bool,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
}

impl ImageLayout {
    pub fn from_ifd(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let (width, height) = (width as usize, height as usize);
        if width == 0 || height == 0 {
            return Err(TiffError::MissingDimensions);
        }

        let samples_per_pixel = ifd.get_samples_per_pixel().max(1) as usize;

        // Every sample shares the first BitsPerSample and SampleFormat value
        let bits = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
            tiff_reader.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?.first().copied().unwrap_or(1)
        } else {
            1
        };
        let format = if ifd.has_tag(tags::SAMPLE_FORMAT) {
            tiff_reader.read_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?.first().copied().unwrap_or(1)
        } else {
            1
        };
        let data_type = DataType::from_tiff(bits as u16, format as u16)?;

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);
        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64);
        let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64) as u16;

        let tiled = ifd.is_tiled();
        let (chunk_width, chunk_height, offsets_tag, counts_tag) = if tiled {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0) as usize;
            let tile_height = ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0) as usize;
            if tile_width == 0 || tile_height == 0 {
                return Err(TiffError::UnsupportedLayout("zero tile size".to_string()));
            }
            (tile_width, tile_height, tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .map(|rows| (rows as usize).clamp(1, height))
                .unwrap_or(height);
            (width, rows_per_strip, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };

        let offsets = tiff_reader.read_tag_values(reader, ifd, offsets_tag)?;
        let byte_counts = tiff_reader.read_tag_values(reader, ifd, counts_tag)?;
        if offsets.len() != byte_counts.len() {
            return Err(TiffError::UnsupportedLayout(format!(
                "{} chunk offsets but {} byte counts", offsets.len(), byte_counts.len())));
        }

        let layout = ImageLayout {
            width,
            height,
            samples_per_pixel,
            data_type,
            compression,
            predictor,
            planar,
            chunk_width,
            chunk_height,
            tiled,
            offsets,
            byte_counts,
        };

        if layout.offsets.len() < layout.expected_chunks() {
            return Err(TiffError::UnsupportedLayout(format!(
                "{} chunks present, {} needed", layout.offsets.len(), layout.expected_chunks())));
        }

        Ok(layout)
    }

    fn chunks_across(&self) -> usize {
        self.width.div_ceil(self.chunk_width)
    }

    fn chunks_down(&self) -> usize {
        self.height.div_ceil(self.chunk_height)
    }

    fn expected_chunks(&self) -> usize {
        let per_plane = self.chunks_across() * self.chunks_down();
        if self.planar == planar_config::PLANAR {
            per_plane * self.samples_per_pixel
        } else {
            per_plane
        }
    }

    /// Samples stored per pixel within one chunk
    fn chunk_samples(&self) -> usize {
        if self.planar == planar_config::PLANAR { 1 } else { self.samples_per_pixel }
    }

    /// Read band `band` (0-based) as row-major samples
    pub fn read_band(&self, tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, band: usize) -> TiffResult<Vec<f64>> {
        if band >= self.samples_per_pixel {
            return Err(TiffError::GenericError(format!(
                "Band {} requested from an image with {} bands", band + 1, self.samples_per_pixel)));
        }

        let handler = tiff_reader.handler()?;
        let compression = CompressionFactory::create_handler(self.compression)?;
        debug!("Reading band {} ({}x{} {}, {} {}, {})",
               band + 1, self.width, self.height, self.data_type,
               self.offsets.len(), if self.tiled { "tiles" } else { "strips" }, compression.name());

        let chunk_samples = self.chunk_samples();
        let sample_size = self.data_type.size_bytes();
        let (first_chunk, sample_in_pixel) = if self.planar == planar_config::PLANAR {
            (band * self.chunks_across() * self.chunks_down(), 0)
        } else {
            (0, band)
        };

        let mut output = vec![0.0; self.width * self.height];
        let mut decoded = Vec::new();

        for chunk_row in 0..self.chunks_down() {
            for chunk_col in 0..self.chunks_across() {
                let index = first_chunk + chunk_row * self.chunks_across() + chunk_col;
                let y0 = chunk_row * self.chunk_height;
                let x0 = chunk_col * self.chunk_width;

                // Strips store only the rows that exist, tiles are always full size
                let stored_rows = if self.tiled {
                    self.chunk_height
                } else {
                    self.chunk_height.min(self.height - y0)
                };
                let expected_bytes = self.chunk_width * stored_rows * chunk_samples * sample_size;

                let raw = tiff_reader.read_bytes_at(reader, self.offsets[index], self.byte_counts[index])?;
                let mut data = compression.decompress(&raw)?;
                if data.len() < expected_bytes {
                    return Err(TiffError::GenericError(format!(
                        "Chunk {} decoded to {} bytes, expected {}", index, data.len(), expected_bytes)));
                }
                data.truncate(expected_bytes);

                if self.predictor == predictor::HORIZONTAL_DIFFERENCING as u64 {
                    undo_horizontal_differencing(&mut data, self.chunk_width, chunk_samples, sample_size, handler.byte_order());
                } else if self.predictor != predictor::NONE as u64 {
                    return Err(TiffError::UnsupportedLayout(format!("predictor {}", self.predictor)));
                }

                decoded.clear();
                handler.decode_samples(&data, self.data_type, &mut decoded);

                let rows = stored_rows.min(self.height - y0);
                let columns = self.chunk_width.min(self.width - x0);
                for row in 0..rows {
                    let source_row = row * self.chunk_width * chunk_samples;
                    let target_row = (y0 + row) * self.width + x0;
                    for column in 0..columns {
                        output[target_row + column] = decoded[source_row + column * chunk_samples + sample_in_pixel];
                    }
                }
            }
        }

        Ok(output)
    }
}
