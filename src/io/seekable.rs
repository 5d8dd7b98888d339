//! Readers the TIFF codec can seek in
//!
//! Tag values and image chunks are read from buffered files and, for inline
//! tag values, from small in-memory cursors.

use std::io::{Read, Seek};

pub trait SeekableReader: Read + Seek {}

impl<T: Read + Seek> SeekableReader for T {}
