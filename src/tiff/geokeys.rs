//! GeoTIFF georeferencing: GeoKey directory, tiepoints and pixel scale
//!
//! Reading covers what GDAL and the MODIS tools produce: EPSG coded
//! geographic and projected systems, and the user-defined sinusoidal
//! projection on a sphere. Writing emits the same forms.

use log::{debug, warn};

use crate::coordinate::{CoordinateSystem, CoordinateSystemFactory, MODIS_SPHERE_RADIUS};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{geo_keys, geo_values, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// One key of the GeoKey directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    /// 0 for inline SHORT values, otherwise the tag holding the value
    pub location: u16,
    pub count: u16,
    pub value_offset: u16,
}

/// A parsed (or to-be-written) GeoKey directory with its parameter tags
#[derive(Debug, Clone, Default)]
pub struct GeoKeyDirectory {
    pub entries: Vec<GeoKeyEntry>,
    pub doubles: Vec<f64>,
    pub ascii: String,
}

impl GeoKeyDirectory {
    /// Reads the directory, returning `None` when the IFD carries no GeoKeys
    pub fn read(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Option<Self>> {
        if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            return Ok(None);
        }

        let raw = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
        if raw.len() < 4 {
            return Err(TiffError::GenericError("Invalid GeoKey directory header".to_string()));
        }

        let key_count = raw[3] as usize;
        debug!("GeoKey directory: version={}, revision={}.{}, keys={}", raw[0], raw[1], raw[2], key_count);

        let mut entries = Vec::with_capacity(key_count);
        for key in raw[4..].chunks_exact(4).take(key_count) {
            entries.push(GeoKeyEntry {
                key_id: key[0] as u16,
                location: key[1] as u16,
                count: key[2] as u16,
                value_offset: key[3] as u16,
            });
        }

        let doubles = if ifd.has_tag(tags::GEO_DOUBLE_PARAMS_TAG) {
            tiff_reader.read_tag_doubles(reader, ifd, tags::GEO_DOUBLE_PARAMS_TAG)?
        } else {
            Vec::new()
        };
        let ascii = if ifd.has_tag(tags::GEO_ASCII_PARAMS_TAG) {
            tiff_reader.read_tag_ascii(reader, ifd, tags::GEO_ASCII_PARAMS_TAG)?
        } else {
            String::new()
        };

        Ok(Some(GeoKeyDirectory { entries, doubles, ascii }))
    }

    fn entry(&self, key_id: u16) -> Option<&GeoKeyEntry> {
        self.entries.iter().find(|entry| entry.key_id == key_id)
    }

    /// Value of an inline SHORT key
    pub fn short(&self, key_id: u16) -> Option<u16> {
        self.entry(key_id)
            .filter(|entry| entry.location == 0)
            .map(|entry| entry.value_offset)
    }

    /// Value of a key stored in GeoDoubleParams
    pub fn double(&self, key_id: u16) -> Option<f64> {
        self.entry(key_id)
            .filter(|entry| entry.location == tags::GEO_DOUBLE_PARAMS_TAG)
            .and_then(|entry| self.doubles.get(entry.value_offset as usize).copied())
    }

    /// Whether tiepoints refer to pixel centres rather than pixel corners
    pub fn is_pixel_is_point(&self) -> bool {
        self.short(geo_keys::GT_RASTER_TYPE) == Some(2)
    }

    /// Interprets the keys as a coordinate system
    ///
    /// Returns `None` for directories this crate cannot interpret, in which
    /// case callers fall back to their assumed source projection.
    pub fn coordinate_system(&self) -> Option<CoordinateSystem> {
        if let Some(code) = self.short(geo_keys::PROJECTED_CS_TYPE) {
            if code != geo_values::USER_DEFINED {
                return Some(CoordinateSystemFactory::from_epsg(code as u32));
            }
        }

        if self.short(geo_keys::PROJ_COORD_TRANS) == Some(geo_values::CT_SINUSOIDAL) {
            let radius = self.double(geo_keys::GEOG_SEMI_MAJOR_AXIS).unwrap_or(MODIS_SPHERE_RADIUS);
            if (radius - MODIS_SPHERE_RADIUS).abs() > 1.0 {
                warn!("Sinusoidal projection on a sphere of radius {} is not supported", radius);
                return None;
            }
            return Some(CoordinateSystem::ModisSinusoidal);
        }

        if self.short(geo_keys::GT_MODEL_TYPE) == Some(geo_values::MODEL_TYPE_GEOGRAPHIC) {
            if let Some(code) = self.short(geo_keys::GEOGRAPHIC_TYPE) {
                if code != geo_values::USER_DEFINED {
                    return Some(CoordinateSystemFactory::from_epsg(code as u32));
                }
            }
        }

        warn!("GeoKey directory does not describe a supported coordinate system");
        None
    }

    /// Builds the directory that describes `crs`
    pub fn for_coordinate_system(crs: &CoordinateSystem) -> Self {
        let mut directory = GeoKeyDirectory::default();

        match crs {
            CoordinateSystem::ModisSinusoidal => {
                directory.push_short(geo_keys::GT_MODEL_TYPE, geo_values::MODEL_TYPE_PROJECTED);
                directory.push_short(geo_keys::GT_RASTER_TYPE, geo_values::RASTER_PIXEL_IS_AREA);
                directory.push_ascii(geo_keys::GT_CITATION, "MODIS Sinusoidal");
                directory.push_short(geo_keys::GEOGRAPHIC_TYPE, geo_values::USER_DEFINED);
                directory.push_short(geo_keys::GEOG_GEODETIC_DATUM, geo_values::USER_DEFINED);
                directory.push_short(geo_keys::GEOG_ANGULAR_UNITS, geo_values::ANGULAR_DEGREE);
                directory.push_short(geo_keys::GEOG_ELLIPSOID, geo_values::USER_DEFINED);
                directory.push_double(geo_keys::GEOG_SEMI_MAJOR_AXIS, MODIS_SPHERE_RADIUS);
                directory.push_double(geo_keys::GEOG_SEMI_MINOR_AXIS, MODIS_SPHERE_RADIUS);
                directory.push_short(geo_keys::PROJECTED_CS_TYPE, geo_values::USER_DEFINED);
                directory.push_short(geo_keys::PROJECTION, geo_values::USER_DEFINED);
                directory.push_short(geo_keys::PROJ_COORD_TRANS, geo_values::CT_SINUSOIDAL);
                directory.push_short(geo_keys::PROJ_LINEAR_UNITS, geo_values::LINEAR_METER);
                directory.push_double(geo_keys::PROJ_FALSE_EASTING, 0.0);
                directory.push_double(geo_keys::PROJ_FALSE_NORTHING, 0.0);
                directory.push_double(geo_keys::PROJ_CENTER_LONG, 0.0);
            },
            other => match other.epsg_code() {
                Some(code) if other.is_geographic() => {
                    directory.push_short(geo_keys::GT_MODEL_TYPE, geo_values::MODEL_TYPE_GEOGRAPHIC);
                    directory.push_short(geo_keys::GT_RASTER_TYPE, geo_values::RASTER_PIXEL_IS_AREA);
                    directory.push_short(geo_keys::GEOGRAPHIC_TYPE, code as u16);
                    directory.push_short(geo_keys::GEOG_ANGULAR_UNITS, geo_values::ANGULAR_DEGREE);
                },
                Some(code) => {
                    directory.push_short(geo_keys::GT_MODEL_TYPE, geo_values::MODEL_TYPE_PROJECTED);
                    directory.push_short(geo_keys::GT_RASTER_TYPE, geo_values::RASTER_PIXEL_IS_AREA);
                    directory.push_short(geo_keys::PROJECTED_CS_TYPE, code as u16);
                    directory.push_short(geo_keys::PROJ_LINEAR_UNITS, geo_values::LINEAR_METER);
                },
                None => {
                    directory.push_short(geo_keys::GT_RASTER_TYPE, geo_values::RASTER_PIXEL_IS_AREA);
                },
            },
        }

        directory
    }

    fn push_short(&mut self, key_id: u16, value: u16) {
        self.entries.push(GeoKeyEntry { key_id, location: 0, count: 1, value_offset: value });
    }

    fn push_double(&mut self, key_id: u16, value: f64) {
        let index = self.doubles.len() as u16;
        self.doubles.push(value);
        self.entries.push(GeoKeyEntry {
            key_id,
            location: tags::GEO_DOUBLE_PARAMS_TAG,
            count: 1,
            value_offset: index,
        });
    }

    fn push_ascii(&mut self, key_id: u16, value: &str) {
        let offset = self.ascii.len() as u16;
        self.ascii.push_str(value);
        self.ascii.push('|');
        self.entries.push(GeoKeyEntry {
            key_id,
            location: tags::GEO_ASCII_PARAMS_TAG,
            count: value.len() as u16 + 1,
            value_offset: offset,
        });
    }

    /// Flattens the directory into the SHORT array of the GeoKeyDirectory tag
    pub fn to_shorts(&self) -> Vec<u16> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|entry| entry.key_id);

        let mut shorts = vec![1, 1, 0, sorted.len() as u16];
        for entry in sorted {
            shorts.extend_from_slice(&[entry.key_id, entry.location, entry.count, entry.value_offset]);
        }
        shorts
    }
}

/// Reads the affine geotransform `[origin_x, pixel_width, 0, origin_y, 0, pixel_height]`
///
/// Tiepoint plus pixel scale is preferred; a ModelTransformation matrix is
/// accepted when it has no rotation terms.
pub fn read_geotransform(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<[f64; 6]> {
    if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
        let scale = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        let tiepoint = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err(TiffError::MissingGeoreference);
        }

        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Ok([origin_x, scale[0], 0.0, origin_y, 0.0, -scale[1]]);
    }

    if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
        let matrix = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
        if matrix.len() < 16 {
            return Err(TiffError::MissingGeoreference);
        }
        if matrix[1] != 0.0 || matrix[4] != 0.0 {
            return Err(TiffError::UnsupportedLayout("rotated rasters are not supported".to_string()));
        }
        return Ok([matrix[3], matrix[0], 0.0, matrix[7], 0.0, matrix[5]]);
    }

    Err(TiffError::MissingGeoreference)
}

/// Splits a north-up geotransform into ModelPixelScale and ModelTiepoint values
pub fn geotransform_tags(geotransform: &[f64; 6]) -> ([f64; 3], [f64; 6]) {
    let scale = [geotransform[1], -geotransform[5], 0.0];
    let tiepoint = [0.0, 0.0, 0.0, geotransform[0], geotransform[3], 0.0];
    (scale, tiepoint)
}
