//! Parsed structure of a TIFF file

use crate::io::byte_order::ByteOrder;
use crate::tiff::ifd::IFD;

/// Header facts and directories of one file
///
/// Pixel data stays on disk; `ImageLayout` reads it through the offsets
/// recorded in the directories.
#[derive(Debug)]
pub struct TIFF {
    pub ifds: Vec<IFD>,
    pub is_big_tiff: bool,
    pub byte_order: ByteOrder,
}

impl TIFF {
    pub fn new(is_big_tiff: bool, byte_order: ByteOrder) -> Self {
        TIFF { ifds: Vec::new(), is_big_tiff, byte_order }
    }

    /// Directory of the full-resolution image
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    /// Number of directories, overviews and masks included
    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }
}
