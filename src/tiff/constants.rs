//! TIFF and GeoTIFF constants
//!
//! Numeric codes for the subset of TIFF 6.0, BigTIFF and GeoTIFF 1.0 that
//! the mosaic pipeline reads and writes.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// BigTIFF version number (43)
    pub const BIG_TIFF_VERSION: u16 = 43;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// BigTIFF offset size (8 bytes)
    pub const BIGTIFF_OFFSET_SIZE: u16 = 8;
}

/// Field types from TIFF 6.0 and BigTIFF
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
    pub const LONG8: u16 = 16;     // BigTIFF 64-bit unsigned integer
    pub const SLONG8: u16 = 17;    // BigTIFF 64-bit signed integer
    pub const IFD8: u16 = 18;      // BigTIFF 64-bit IFD offset
}

/// Standard TIFF tags
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;
    pub const STRIP_OFFSETS: u16 = 273;
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    pub const ROWS_PER_STRIP: u16 = 278;
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    pub const PLANAR_CONFIGURATION: u16 = 284;
    pub const PREDICTOR: u16 = 317;
    pub const TILE_WIDTH: u16 = 322;
    pub const TILE_LENGTH: u16 = 323;
    pub const TILE_OFFSETS: u16 = 324;
    pub const TILE_BYTE_COUNTS: u16 = 325;
    pub const SAMPLE_FORMAT: u16 = 339;

    // GeoTIFF tags
    pub const MODEL_PIXEL_SCALE_TAG: u16 = 33550;   // Pixel size in map units
    pub const MODEL_TIEPOINT_TAG: u16 = 33922;      // Links raster to world coordinates
    pub const MODEL_TRANSFORMATION_TAG: u16 = 34264; // Affine transformation matrix
    pub const GEO_KEY_DIRECTORY_TAG: u16 = 34735;   // GeoTIFF keys structure
    pub const GEO_DOUBLE_PARAMS_TAG: u16 = 34736;   // GeoTIFF double parameters
    pub const GEO_ASCII_PARAMS_TAG: u16 = 34737;    // GeoTIFF ASCII parameters

    // GDAL specific tags
    pub const GDAL_METADATA: u16 = 42112;          // XML metadata
    pub const GDAL_NODATA: u16 = 42113;            // NoData marker value
}

/// Compression types
pub mod compression {
    pub const NONE: u16 = 1;              // No compression
    pub const DEFLATE: u16 = 8;           // Adobe Deflate (zlib)
    pub const ZSTD: u16 = 14;             // Zstandard compression
}

/// Photometric interpretation values
pub mod photometric {
    pub const BLACK_IS_ZERO: u16 = 1;     // Minimum value is black
}

/// Planar configuration values
pub mod planar_config {
    pub const CHUNKY: u16 = 1;            // Components stored interleaved
    pub const PLANAR: u16 = 2;            // Components stored separately
}

/// Sample format values
pub mod sample_format {
    pub const UNSIGNED: u16 = 1;          // Unsigned integer data
    pub const SIGNED: u16 = 2;            // Signed integer data
    pub const IEEEFP: u16 = 3;            // IEEE floating point data
}

/// Predictor values
pub mod predictor {
    pub const NONE: u16 = 1;                    // No prediction scheme
    pub const HORIZONTAL_DIFFERENCING: u16 = 2; // Horizontal differencing
}

/// GeoTIFF key IDs
pub mod geo_keys {
    pub const GT_MODEL_TYPE: u16 = 1024;        // GTModelTypeGeoKey
    pub const GT_RASTER_TYPE: u16 = 1025;       // GTRasterTypeGeoKey
    pub const GT_CITATION: u16 = 1026;          // GTCitationGeoKey
    pub const GEOGRAPHIC_TYPE: u16 = 2048;      // GeographicTypeGeoKey
    pub const GEOG_CITATION: u16 = 2049;        // GeogCitationGeoKey
    pub const GEOG_GEODETIC_DATUM: u16 = 2050;  // GeogGeodeticDatumGeoKey
    pub const GEOG_ANGULAR_UNITS: u16 = 2054;   // GeogAngularUnitsGeoKey
    pub const GEOG_ELLIPSOID: u16 = 2056;       // GeogEllipsoidGeoKey
    pub const GEOG_SEMI_MAJOR_AXIS: u16 = 2057; // GeogSemiMajorAxisGeoKey
    pub const GEOG_SEMI_MINOR_AXIS: u16 = 2058; // GeogSemiMinorAxisGeoKey
    pub const PROJECTED_CS_TYPE: u16 = 3072;    // ProjectedCSTypeGeoKey
    pub const PROJECTION: u16 = 3074;           // ProjectionGeoKey
    pub const PROJ_COORD_TRANS: u16 = 3075;     // ProjCoordTransGeoKey
    pub const PROJ_LINEAR_UNITS: u16 = 3076;    // ProjLinearUnitsGeoKey
    pub const PROJ_FALSE_EASTING: u16 = 3082;   // ProjFalseEastingGeoKey
    pub const PROJ_FALSE_NORTHING: u16 = 3083;  // ProjFalseNorthingGeoKey
    pub const PROJ_CENTER_LONG: u16 = 3088;     // ProjCenterLongGeoKey
}

/// GeoKey values
pub mod geo_values {
    pub const MODEL_TYPE_PROJECTED: u16 = 1;
    pub const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
    pub const RASTER_PIXEL_IS_AREA: u16 = 1;
    pub const USER_DEFINED: u16 = 32767;
    pub const CT_SINUSOIDAL: u16 = 24;
    pub const LINEAR_METER: u16 = 9001;
    pub const ANGULAR_DEGREE: u16 = 9102;
}
