//! Horizontal differencing predictor (TIFF predictor 2)
//!
//! Each sample is stored as the difference to the sample of the same channel
//! one pixel to the left, using wrapping integer arithmetic of the sample's
//! width. Rows are independent.

use byteorder::{BigEndian, ByteOrder as Endianness, LittleEndian};

use crate::io::byte_order::ByteOrder;

/// Reverse the predictor in place
///
/// # Arguments
/// * `data` - Decompressed chunk data
/// * `row_width` - Chunk width in pixels
/// * `samples` - Samples per pixel stored in the chunk
/// * `sample_size` - Bytes per sample (1, 2, 4 or 8)
/// * `byte_order` - Byte order of the samples
pub fn undo_horizontal_differencing(
    data: &mut [u8],
    row_width: usize,
    samples: usize,
    sample_size: usize,
    byte_order: ByteOrder,
) {
    match byte_order {
        ByteOrder::LittleEndian => accumulate::<LittleEndian>(data, row_width, samples, sample_size),
        ByteOrder::BigEndian => accumulate::<BigEndian>(data, row_width, samples, sample_size),
    }
}

/// Apply the predictor in place to little-endian samples
pub fn apply_horizontal_differencing(data: &mut [u8], row_width: usize, samples: usize, sample_size: usize) {
    let row_bytes = row_width * samples * sample_size;
    if row_bytes == 0 {
        return;
    }
    let stride = samples * sample_size;

    for row in data.chunks_exact_mut(row_bytes) {
        // Walk backwards so every difference uses the original left neighbour
        let mut position = row_bytes;
        while position > stride {
            position -= sample_size;
            let left = position - stride;
            match sample_size {
                1 => row[position] = row[position].wrapping_sub(row[left]),
                2 => {
                    let value = LittleEndian::read_u16(&row[position..]).wrapping_sub(LittleEndian::read_u16(&row[left..]));
                    LittleEndian::write_u16(&mut row[position..], value);
                },
                4 => {
                    let value = LittleEndian::read_u32(&row[position..]).wrapping_sub(LittleEndian::read_u32(&row[left..]));
                    LittleEndian::write_u32(&mut row[position..], value);
                },
                8 => {
                    let value = LittleEndian::read_u64(&row[position..]).wrapping_sub(LittleEndian::read_u64(&row[left..]));
                    LittleEndian::write_u64(&mut row[position..], value);
                },
                _ => return,
            }
        }
    }
}

fn accumulate<B: Endianness>(data: &mut [u8], row_width: usize, samples: usize, sample_size: usize) {
    let row_bytes = row_width * samples * sample_size;
    if row_bytes == 0 {
        return;
    }
    let stride = samples * sample_size;

    for row in data.chunks_exact_mut(row_bytes) {
        let mut position = stride;
        while position < row_bytes {
            let left = position - stride;
            match sample_size {
                1 => row[position] = row[position].wrapping_add(row[left]),
                2 => {
                    let value = B::read_u16(&row[position..]).wrapping_add(B::read_u16(&row[left..]));
                    B::write_u16(&mut row[position..], value);
                },
                4 => {
                    let value = B::read_u32(&row[position..]).wrapping_add(B::read_u32(&row[left..]));
                    B::write_u32(&mut row[position..], value);
                },
                8 => {
                    let value = B::read_u64(&row[position..]).wrapping_add(B::read_u64(&row[left..]));
                    B::write_u64(&mut row[position..], value);
                },
                _ => return,
            }
            position += sample_size;
        }
    }
}
