//! Low-level reading helpers shared by the TIFF codec

pub mod seekable;
pub mod byte_order;
