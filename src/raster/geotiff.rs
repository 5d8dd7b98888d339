//! GeoTIFF implementation of the raster read and write capabilities

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::compression::CompressionFactory;
use crate::coordinate::{CoordinateSystem, GeoGrid};
use crate::raster::{Band, DataType, RasterDataset, RasterInfo, RasterReader, RasterWriter};
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geokeys::{self, GeoKeyDirectory};
use crate::tiff::image_data::ImageLayout;
use crate::tiff::metadata::{self, GdalMetadata};
use crate::tiff::writer::{ImageDescription, TiffWriter};
use crate::tiff::{TiffReader, TIFF};

/// An opened file with its parsed structure
struct OpenTiff {
    source: BufReader<File>,
    reader: TiffReader,
    tiff: TIFF,
}

impl OpenTiff {
    fn open(path: &Path) -> TiffResult<Self> {
        let file = File::open(path)?;
        let mut source = BufReader::with_capacity(1024 * 1024, file);
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut source)?;
        if tiff.main_ifd().is_none() {
            return Err(TiffError::GenericError(format!("{} contains no image", path.display())));
        }
        Ok(OpenTiff { source, reader, tiff })
    }

    fn layout(&mut self) -> TiffResult<ImageLayout> {
        let ifd = self.tiff.main_ifd().ok_or(TiffError::MissingDimensions)?;
        ImageLayout::from_ifd(&self.reader, &mut self.source, ifd)
    }

    fn ascii_tag(&mut self, tag: u16) -> TiffResult<Option<String>> {
        let ifd = self.tiff.main_ifd().ok_or(TiffError::MissingDimensions)?;
        if !ifd.has_tag(tag) {
            return Ok(None);
        }
        self.reader.read_tag_ascii(&mut self.source, ifd, tag).map(Some)
    }
}

/// Reads and writes single-image GeoTIFF files
pub struct GeoTiffDriver {
    /// Compression name used for written files
    compression: String,
    /// Coordinate system of files that carry no GeoKeys
    assumed_crs: CoordinateSystem,
}

impl GeoTiffDriver {
    pub fn new(compression: &str, assumed_crs: CoordinateSystem) -> TiffResult<Self> {
        // Reject unknown names up front rather than on the first write
        CompressionFactory::get_handler_by_name(compression)?;
        Ok(GeoTiffDriver { compression: compression.to_string(), assumed_crs })
    }

    fn read_grid(&self, file: &mut OpenTiff, layout: &ImageLayout, path: &Path) -> TiffResult<GeoGrid> {
        let ifd = file.tiff.main_ifd().ok_or(TiffError::MissingDimensions)?;
        let mut geotransform = geokeys::read_geotransform(&file.reader, &mut file.source, ifd)?;

        let directory = GeoKeyDirectory::read(&file.reader, &mut file.source, ifd)?;
        let crs = match directory.as_ref().and_then(GeoKeyDirectory::coordinate_system) {
            Some(crs) => crs,
            None => {
                debug!("{}: no usable GeoKeys, assuming {}", path.display(), self.assumed_crs);
                self.assumed_crs
            }
        };

        // Tiepoints on pixel centres move the corner origin by half a pixel
        if directory.as_ref().is_some_and(GeoKeyDirectory::is_pixel_is_point) {
            geotransform[0] -= geotransform[1] / 2.0;
            geotransform[3] -= geotransform[5] / 2.0;
        }

        if geotransform[1] <= 0.0 || geotransform[5] == 0.0 {
            return Err(TiffError::UnsupportedTransform(format!(
                "pixel size {} x {}", geotransform[1], geotransform[5])));
        }

        Ok(GeoGrid::from_geotransform(&geotransform, layout.width, layout.height, crs))
    }

    fn read_nodata(file: &mut OpenTiff, path: &Path) -> TiffResult<Option<f64>> {
        Ok(file.ascii_tag(tags::GDAL_NODATA)?.and_then(|text| {
            let value = metadata::parse_nodata(&text);
            if value.is_none() {
                warn!("{}: ignoring unparsable no-data value '{}'", path.display(), text);
            }
            value
        }))
    }
}

impl RasterReader for GeoTiffDriver {
    fn read_raster(&self, path: &Path) -> TiffResult<RasterInfo> {
        let mut file = OpenTiff::open(path)?;
        let layout = file.layout()?;
        let grid = self.read_grid(&mut file, &layout, path)?;
        let nodata = Self::read_nodata(&mut file, path)?;

        debug!("{}: {} bands of {}, grid {}", path.display(), layout.samples_per_pixel, layout.data_type, grid);

        Ok(RasterInfo {
            grid,
            band_count: layout.samples_per_pixel,
            data_type: layout.data_type,
            nodata,
        })
    }

    fn read_band(&self, path: &Path, band_index: usize) -> TiffResult<Band> {
        if band_index == 0 {
            return Err(TiffError::GenericError("Band indices start at 1".to_string()));
        }

        let mut file = OpenTiff::open(path)?;
        let layout = file.layout()?;
        let data = layout.read_band(&file.reader, &mut file.source, band_index - 1)?;

        Ok(Band::new(layout.width, layout.height, data))
    }

    fn read_metadata(&self, path: &Path) -> TiffResult<GdalMetadata> {
        let mut file = OpenTiff::open(path)?;
        match file.ascii_tag(tags::GDAL_METADATA)? {
            Some(xml) => metadata::parse_xml(&xml),
            None => Ok(GdalMetadata::default()),
        }
    }
}

impl RasterWriter for GeoTiffDriver {
    fn create_raster(&self, path: &Path, grid: &GeoGrid, band_count: usize, data_type: DataType) -> TiffResult<RasterDataset> {
        if band_count != 1 {
            return Err(TiffError::UnsupportedLayout(format!(
                "{} bands requested, only single-band files are written", band_count)));
        }
        if grid.x_size == 0 || grid.y_size == 0 {
            return Err(TiffError::MissingDimensions);
        }

        Ok(RasterDataset::new(path.to_path_buf(), *grid, band_count, data_type))
    }

    fn write_band(&self, dataset: &mut RasterDataset, band_index: usize, band: Band, nodata: Option<f64>) -> TiffResult<()> {
        if band.width != dataset.grid.x_size || band.height != dataset.grid.y_size {
            return Err(TiffError::GenericError(format!(
                "Band of {}x{} does not match the {}x{} raster",
                band.width, band.height, dataset.grid.x_size, dataset.grid.y_size)));
        }

        let band_count = dataset.band_count();
        let slot = band_index.checked_sub(1)
            .and_then(|index| dataset.bands.get_mut(index))
            .ok_or_else(|| TiffError::GenericError(format!(
                "Band {} out of range (1..={})", band_index, band_count)))?;
        *slot = Some(band);

        if nodata.is_some() {
            dataset.nodata = nodata;
        }
        Ok(())
    }

    fn close(&self, dataset: RasterDataset) -> TiffResult<PathBuf> {
        let band = dataset.band(1).ok_or_else(|| TiffError::GenericError(format!(
            "{} closed before its band was written", dataset.path.display())))?;

        let description = ImageDescription {
            width: dataset.grid.x_size,
            height: dataset.grid.y_size,
            data_type: dataset.data_type,
            geotransform: dataset.grid.geotransform(),
            crs: &dataset.grid.crs,
            nodata: dataset.nodata,
            metadata: &dataset.metadata,
        };

        let writer = TiffWriter::new(CompressionFactory::get_handler_by_name(&self.compression)?);
        writer.write(&dataset.path, &description, &band.data)?;

        info!("Closed {}", dataset.path.display());
        Ok(dataset.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn written_raster_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2020001_rf.tif");
        let driver = GeoTiffDriver::new("zstd", CoordinateSystem::ModisSinusoidal).unwrap();

        let grid = GeoGrid::new(0.0, 6.0, 1.0, -1.0, 3, 2, CoordinateSystem::WGS84);
        let mut dataset = driver.create_raster(&path, &grid, 1, DataType::Int16).unwrap();
        driver.write_band(&mut dataset, 1, Band::new(3, 2, vec![1.0, 2.4, -999.0, 400.0, 0.0, 7.6]), Some(-999.0)).unwrap();
        let mut items = BTreeMap::new();
        items.insert("Unit".to_string(), "W/m^2".to_string());
        dataset.set_band_metadata(1, items.clone());
        assert_eq!(driver.close(dataset).unwrap(), path);

        let info = driver.read_raster(&path).unwrap();
        assert_eq!(info.grid, grid);
        assert_eq!(info.band_count, 1);
        assert_eq!(info.data_type, DataType::Int16);
        assert_eq!(info.nodata, Some(-999.0));

        let band = driver.read_band(&path, 1).unwrap();
        assert_eq!(band.data, vec![1.0, 2.0, -999.0, 400.0, 0.0, 8.0]);
        assert!(driver.read_band(&path, 2).is_err());

        assert_eq!(driver.read_metadata(&path).unwrap().band(0), items);
    }

    #[test]
    fn rejects_unknown_compression_and_multiband_output() {
        assert!(GeoTiffDriver::new("lzw", CoordinateSystem::WGS84).is_err());

        let driver = GeoTiffDriver::new("deflate", CoordinateSystem::WGS84).unwrap();
        let grid = GeoGrid::new(0.0, 0.0, 1.0, -1.0, 2, 2, CoordinateSystem::WGS84);
        assert!(driver.create_raster(Path::new("x.tif"), &grid, 2, DataType::Int16).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let driver = GeoTiffDriver::new("deflate", CoordinateSystem::WGS84).unwrap();
        let result = driver.read_raster(Path::new("/nonexistent/2020001.tif"));
        assert!(matches!(result, Err(TiffError::IoError(_))));
    }
}
