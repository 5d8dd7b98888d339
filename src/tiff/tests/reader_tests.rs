//! Tests for the TIFF reader, and for files produced by the writer

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use crate::compression::CompressionFactory;
use crate::coordinate::CoordinateSystem;
use crate::raster::DataType;
use crate::tiff::constants::tags;
use crate::tiff::geokeys::{self, GeoKeyDirectory};
use crate::tiff::image_data::ImageLayout;
use crate::tiff::metadata::{self, GdalMetadata};
use crate::tiff::writer::{ImageDescription, TiffWriter};
use crate::tiff::{TiffError, TiffReader};

use super::test_utils::{create_big_endian_tiff_buffer, create_test_bigtiff_buffer, create_test_tiff_buffer};

#[test]
fn test_read_classic_tiff() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 1);

    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((800, 600)));
    assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap(), vec![16, 8]);
}

#[test]
fn test_read_bigtiff() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    assert!(tiff.is_big_tiff);
    assert!(reader.is_big_tiff());

    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((1024, 768)));
    assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::SAMPLE_FORMAT).unwrap(), vec![2, 2, 2, 2]);
}

#[test]
fn test_read_big_endian_offset_values() {
    let mut cursor = create_big_endian_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((300, 200)));
    assert_eq!(
        reader.read_tag_doubles(&mut cursor, ifd, tags::MODEL_PIXEL_SCALE_TAG).unwrap(),
        vec![0.5, 0.25, 0.0]
    );
    assert!(matches!(
        reader.read_tag_values(&mut cursor, ifd, tags::TILE_WIDTH),
        Err(TiffError::TagNotFound(322))
    ));
}

#[test]
fn test_rejects_unknown_version() {
    let mut cursor = create_test_tiff_buffer();
    cursor.get_mut()[2] = 41;

    let result = TiffReader::new().read(&mut cursor);
    assert!(matches!(result, Err(TiffError::UnsupportedVersion(41))));
}

#[test]
fn test_written_geotiff_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("2019001_SCA.tif");

    let mut band = BTreeMap::new();
    band.insert("Description".to_string(), "Snow Cover".to_string());
    band.insert("Unit".to_string(), "%".to_string());
    let mut gdal_metadata = GdalMetadata::default();
    gdal_metadata.bands.insert(0, band);

    let crs = CoordinateSystem::ModisSinusoidal;
    let geotransform = [-1111950.5197, 463.3127165, 0.0, 5559752.5984, 0.0, -463.3127165];
    let samples = vec![-999.0, 15.0, 100.0, 42.0, -999.0, 57.0];
    let image = ImageDescription {
        width: 3,
        height: 2,
        data_type: DataType::Int16,
        geotransform,
        crs: &crs,
        nodata: Some(-999.0),
        metadata: &gdal_metadata,
    };

    let writer = TiffWriter::new(CompressionFactory::get_handler_by_name("deflate").unwrap());
    writer.write(&path, &image, &samples).unwrap();

    let mut file = BufReader::new(File::open(&path).unwrap());
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut file).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let layout = ImageLayout::from_ifd(&reader, &mut file, ifd).unwrap();
    assert_eq!((layout.width, layout.height), (3, 2));
    assert_eq!(layout.data_type, DataType::Int16);
    assert_eq!(layout.predictor, 2);
    assert_eq!(layout.read_band(&reader, &mut file, 0).unwrap(), samples);

    assert_eq!(geokeys::read_geotransform(&reader, &mut file, ifd).unwrap(), geotransform);
    let directory = GeoKeyDirectory::read(&reader, &mut file, ifd).unwrap().unwrap();
    assert_eq!(directory.coordinate_system(), Some(CoordinateSystem::ModisSinusoidal));
    assert!(!directory.is_pixel_is_point());

    let nodata = reader.read_tag_ascii(&mut file, ifd, tags::GDAL_NODATA).unwrap();
    assert_eq!(metadata::parse_nodata(&nodata), Some(-999.0));
    let xml = reader.read_tag_ascii(&mut file, ifd, tags::GDAL_METADATA).unwrap();
    assert_eq!(metadata::parse_xml(&xml).unwrap(), gdal_metadata);
}
