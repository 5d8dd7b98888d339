use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

/// Classic little-endian TIFF with a two-value SHORT stored inline
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // IFD at offset 8
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Entry count

    // ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(800).unwrap();

    // ImageLength (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(600).unwrap();

    // BitsPerSample (tag 258), two SHORTs packed in the value field
    buffer.write_u16::<LittleEndian>(258).unwrap();
    buffer.write_u16::<LittleEndian>(3).unwrap();      // SHORT
    buffer.write_u32::<LittleEndian>(2).unwrap();
    buffer.write_u16::<LittleEndian>(16).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Little-endian BigTIFF with four SHORTs stored inline
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // BigTIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    // IFD at offset 16
    buffer.write_u64::<LittleEndian>(3).unwrap();

    // ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(1024).unwrap();

    // ImageLength (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(768).unwrap();

    // SampleFormat (tag 339), four SHORTs in the 8-byte value field
    buffer.write_u16::<LittleEndian>(339).unwrap();
    buffer.write_u16::<LittleEndian>(3).unwrap();      // SHORT
    buffer.write_u64::<LittleEndian>(4).unwrap();
    for _ in 0..4 {
        buffer.write_u16::<LittleEndian>(2).unwrap();
    }

    // Next IFD offset
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Big-endian TIFF whose pixel scale is stored after the IFD
pub fn create_big_endian_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // TIFF header (big-endian)
    buffer.write_u16::<BigEndian>(0x4D4D).unwrap();    // MM for big-endian
    buffer.write_u16::<BigEndian>(42).unwrap();
    buffer.write_u32::<BigEndian>(8).unwrap();

    // IFD at offset 8: 2 + 3 * 12 + 4 bytes, values follow at 50
    buffer.write_u16::<BigEndian>(3).unwrap();

    // ImageWidth (tag 256) as SHORT, left-justified in the value field
    buffer.write_u16::<BigEndian>(256).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(1).unwrap();
    buffer.write_u16::<BigEndian>(300).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();

    // ImageLength (tag 257) as SHORT
    buffer.write_u16::<BigEndian>(257).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(1).unwrap();
    buffer.write_u16::<BigEndian>(200).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();

    // ModelPixelScale (tag 33550), three DOUBLEs at offset 50
    buffer.write_u16::<BigEndian>(33550).unwrap();
    buffer.write_u16::<BigEndian>(12).unwrap();
    buffer.write_u32::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(50).unwrap();

    buffer.write_u32::<BigEndian>(0).unwrap();

    buffer.write_f64::<BigEndian>(0.5).unwrap();
    buffer.write_f64::<BigEndian>(0.25).unwrap();
    buffer.write_f64::<BigEndian>(0.0).unwrap();

    Cursor::new(buffer)
}
