//! End-to-end runs over product trees of real GeoTIFF files

use std::fs;
use std::path::{Path, PathBuf};

use snowmosaic::coordinate::{CoordinateSystem, GeoGrid};
use snowmosaic::raster::{Band, DataType, GeoTiffDriver, RasterReader, RasterWriter};
use snowmosaic::{DayId, Outcome, PipelineConfig, PipelineError, SnowMosaic};

const NODATA: f64 = -999.0;

/// Tiles and mosaics in WGS84 so nothing is warped
fn geographic_config() -> PipelineConfig {
    PipelineConfig::from_str(r#"
        [raster]
        nodata = -999
        data_type = "int16"
        compression = "deflate"

        [projection]
        source = "EPSG:4326"

        [composite]
        days = 8

        [types.forcing]
        folder = "forcing"
        suffix = "_rf.tif"
        lower = 0
        upper = 400
        description = "Radiative forcing"
        unit = "W/m^2"
    "#).unwrap()
}

fn driver() -> GeoTiffDriver {
    GeoTiffDriver::new("deflate", CoordinateSystem::WGS84).unwrap()
}

fn write_raster(path: &Path, grid: GeoGrid, values: Vec<f64>, nodata: f64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let driver = driver();
    let mut dataset = driver.create_raster(path, &grid, 1, DataType::Int16).unwrap();
    driver.write_band(&mut dataset, 1, Band::new(grid.x_size, grid.y_size, values), Some(nodata)).unwrap();
    driver.close(dataset).unwrap();
}

fn tile_grid(origin_x: f64, origin_y: f64) -> GeoGrid {
    GeoGrid::new(origin_x, origin_y, 1.0, -1.0, 3, 3, CoordinateSystem::WGS84)
}

fn day_folder(root: &Path, day: &str) -> PathBuf {
    root.join("2020").join("forcing").join(day)
}

/// Three tiles across the top and one beneath the rightmost
fn write_l_shape(folder: &Path) {
    let mut a = vec![100.0; 9];
    a[0] = 500.0;
    let mut d = vec![400.0; 9];
    d[8] = -1.0;

    write_raster(&folder.join("h00v00.tif"), tile_grid(0.0, 6.0), a, NODATA);
    write_raster(&folder.join("h01v00.tif"), tile_grid(3.0, 6.0), vec![200.0; 9], NODATA);
    write_raster(&folder.join("h02v00.tif"), tile_grid(6.0, 6.0), vec![300.0; 9], NODATA);
    write_raster(&folder.join("h02v01.tif"), tile_grid(6.0, 3.0), d, NODATA);
}

fn written(outcome: Outcome) -> PathBuf {
    match outcome {
        Outcome::Written(path) => path,
        Outcome::NoInput => panic!("expected a written raster"),
    }
}

#[test]
fn l_shaped_tiles_mosaic() {
    let root = tempfile::tempdir().unwrap();
    let folder = day_folder(root.path(), "2020001");
    write_l_shape(&folder);

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let path = written(api.mosaic_day("forcing", DayId::new(2020, 1)).unwrap());
    assert_eq!(path, folder.join("2020001_rf.tif"));

    let driver = driver();
    let info = driver.read_raster(&path).unwrap();
    assert_eq!(info.grid, GeoGrid::new(0.0, 6.0, 1.0, -1.0, 9, 6, CoordinateSystem::WGS84));
    assert_eq!(info.nodata, Some(NODATA));
    assert_eq!(info.data_type, DataType::Int16);

    let band = driver.read_band(&path, 1).unwrap();
    for row in 0..6 {
        for column in 0..9 {
            let value = band.get(column, row);
            let expected = match (column / 3, row / 3) {
                (0, 0) if row == 0 && column == 0 => NODATA,
                (0, 0) => 100.0,
                (1, 0) => 200.0,
                (2, 0) => 300.0,
                (2, 1) if row == 5 && column == 8 => NODATA,
                (2, 1) => 400.0,
                _ => NODATA,
            };
            assert_eq!(value, expected, "pixel ({}, {})", column, row);
        }
    }
    assert!(band.data.iter().all(|v| *v == NODATA || (0.0..=400.0).contains(v)));

    let metadata = driver.read_metadata(&path).unwrap().band(0);
    assert_eq!(metadata.get("Description").map(String::as_str), Some("Radiative forcing"));
    assert_eq!(metadata.get("Unit").map(String::as_str), Some("W/m^2"));
}

#[test]
fn rebuilding_gives_identical_pixels() {
    let root = tempfile::tempdir().unwrap();
    write_l_shape(&day_folder(root.path(), "2020001"));
    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let driver = driver();

    let first = written(api.mosaic_day("forcing", DayId::new(2020, 1)).unwrap());
    let first_band = driver.read_band(&first, 1).unwrap();

    // The mosaic from the first run now sits among the tiles and must be ignored
    let second = written(api.mosaic_day("forcing", DayId::new(2020, 1)).unwrap());
    assert_eq!(first, second);
    assert_eq!(driver.read_band(&second, 1).unwrap(), first_band);
    assert_eq!(driver.read_raster(&second).unwrap().grid.x_size, 9);
}

#[test]
fn later_tiles_win_overlaps() {
    let root = tempfile::tempdir().unwrap();
    let folder = day_folder(root.path(), "2020002");
    write_raster(&folder.join("b.tif"), tile_grid(1.0, 3.0), vec![2.0; 9], NODATA);
    write_raster(&folder.join("a.tif"), tile_grid(0.0, 3.0), vec![1.0; 9], NODATA);

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let path = written(api.mosaic_day("forcing", DayId::new(2020, 2)).unwrap());

    let band = driver().read_band(&path, 1).unwrap();
    assert_eq!(band.width, 4);
    assert_eq!(&band.data[..4], &[1.0, 2.0, 2.0, 2.0]);
}

#[test]
fn empty_and_missing_days_have_no_input() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(day_folder(root.path(), "2020003")).unwrap();
    fs::write(day_folder(root.path(), "2020003").join("readme.txt"), "no tiles").unwrap();

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    assert_eq!(api.mosaic_day("forcing", DayId::new(2020, 3)).unwrap(), Outcome::NoInput);
    assert_eq!(api.mosaic_day("forcing", DayId::new(2020, 4)).unwrap(), Outcome::NoInput);
}

#[test]
fn unreadable_tiles_are_skipped() {
    let root = tempfile::tempdir().unwrap();
    let folder = day_folder(root.path(), "2020010");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("a_broken.tif"), b"not a tiff").unwrap();
    write_raster(&folder.join("b.tif"), tile_grid(0.0, 3.0), vec![7.0; 9], NODATA);

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let path = written(api.mosaic_day("forcing", DayId::new(2020, 10)).unwrap());
    assert_eq!(driver().read_band(&path, 1).unwrap().data, vec![7.0; 9]);

    let only_broken = day_folder(root.path(), "2020011");
    fs::create_dir_all(&only_broken).unwrap();
    fs::write(only_broken.join("a.tif"), b"II*\0").unwrap();
    let result = api.mosaic_day("forcing", DayId::new(2020, 11));
    assert!(matches!(result, Err(PipelineError::UnreadableRaster { .. })));
}

#[test]
fn tiles_with_truncated_pixel_data_are_skipped() {
    let root = tempfile::tempdir().unwrap();
    let folder = day_folder(root.path(), "2020012");
    write_raster(&folder.join("a.tif"), tile_grid(0.0, 3.0), vec![7.0; 9], NODATA);
    write_raster(&folder.join("b.tif"), tile_grid(3.0, 3.0), vec![9.0; 9], NODATA);

    // The header still parses; only the strip at the end of the file is cut short
    let truncated = folder.join("b.tif");
    let bytes = fs::read(&truncated).unwrap();
    fs::write(&truncated, &bytes[..bytes.len() - 4]).unwrap();
    assert!(driver().read_raster(&truncated).is_ok());

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let path = written(api.mosaic_day("forcing", DayId::new(2020, 12)).unwrap());

    let band = driver().read_band(&path, 1).unwrap();
    assert_eq!(band.width, 6);
    for row in 0..3 {
        for column in 0..6 {
            let expected = if column < 3 { 7.0 } else { NODATA };
            assert_eq!(band.get(column, row), expected, "pixel ({}, {})", column, row);
        }
    }

    let only_truncated = day_folder(root.path(), "2020013");
    fs::create_dir_all(&only_truncated).unwrap();
    fs::copy(&truncated, only_truncated.join("b.tif")).unwrap();
    let result = api.mosaic_day("forcing", DayId::new(2020, 13));
    assert!(matches!(result, Err(PipelineError::UnreadableRaster { .. })));
}

#[test]
fn pixel_size_mismatch_fails_the_day() {
    let root = tempfile::tempdir().unwrap();
    let folder = day_folder(root.path(), "2020020");
    write_raster(&folder.join("a.tif"), tile_grid(0.0, 3.0), vec![1.0; 9], NODATA);
    write_raster(&folder.join("b.tif"),
                 GeoGrid::new(3.0, 3.0, 0.5, -0.5, 2, 2, CoordinateSystem::WGS84),
                 vec![1.0; 4], NODATA);
    write_l_shape(&day_folder(root.path(), "2020021"));

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let result = api.mosaic_day("forcing", DayId::new(2020, 20));
    assert!(matches!(result, Err(PipelineError::IncompatibleGeometry(_))));

    // The failing day does not stop the rest of the year
    let report = api.mosaic_year("forcing", 2020).unwrap();
    assert_eq!(report.written.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, DayId::new(2020, 20));
    assert!(matches!(report.into_result(), Err(PipelineError::BatchFailed { failed: 1, total: 2 })));
}

#[test]
fn sinusoidal_tiles_are_warped_to_geographic() {
    let root = tempfile::tempdir().unwrap();
    let folder = day_folder(root.path(), "2020030");
    let pixel = 463.31271653;
    let grid = GeoGrid::new(0.0, 4.0 * pixel, pixel, -pixel, 4, 4, CoordinateSystem::ModisSinusoidal);
    write_raster(&folder.join("h18v08.tif"), grid, vec![50.0; 16], NODATA);

    let api = SnowMosaic::new(PipelineConfig::builtin().unwrap(), root.path()).unwrap();
    let path = written(api.mosaic_day("forcing", DayId::new(2020, 30)).unwrap());

    let info = driver().read_raster(&path).unwrap();
    assert_eq!(info.grid.crs, CoordinateSystem::WGS84);
    assert!(info.grid.origin_x.abs() < 1e-6);
    assert!(info.grid.pixel_width > 0.0 && info.grid.pixel_width < 0.01);

    let band = driver().read_band(&path, 1).unwrap();
    assert!(band.data.iter().all(|v| *v == 50.0 || *v == NODATA));
    assert!(band.data.iter().any(|v| *v == 50.0));
}

fn mosaic_path(root: &Path, day: u32) -> PathBuf {
    let id = DayId::new(2020, day).to_string();
    day_folder(root, &id).join(format!("{}_rf.tif", id))
}

fn write_daily_mosaic(root: &Path, day: u32, values: Vec<f64>, nodata: f64) {
    let path = mosaic_path(root, day);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let driver = driver();
    let grid = GeoGrid::new(10.0, 50.0, 0.5, -0.5, 2, 2, CoordinateSystem::WGS84);
    let mut dataset = driver.create_raster(&path, &grid, 1, DataType::Int16).unwrap();
    let mut items = std::collections::BTreeMap::new();
    items.insert("Description".to_string(), "Radiative forcing".to_string());
    dataset.set_band_metadata(1, items);
    driver.write_band(&mut dataset, 1, Band::new(2, 2, values), Some(nodata)).unwrap();
    driver.close(dataset).unwrap();
}

#[test]
fn composite_of_partial_window() {
    let root = tempfile::tempdir().unwrap();
    for day in [5, 6, 8, 10, 12] {
        let second = if day == 8 { 40.0 } else { NODATA };
        write_daily_mosaic(root.path(), day, vec![day as f64 * 10.0, second, NODATA, 100.0], NODATA);
    }

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let path = written(api.composite("forcing", DayId::new(2020, 5)).unwrap());
    assert_eq!(path, root.path().join("2020/forcing/composites/2020005_8_days_rf.tif"));

    let driver = driver();
    assert_eq!(driver.read_band(&path, 1).unwrap().data, vec![82.0, 40.0, NODATA, 100.0]);
    assert_eq!(driver.read_raster(&path).unwrap().nodata, Some(NODATA));
    assert_eq!(driver.read_metadata(&path).unwrap().band(0).get("Description").map(String::as_str),
               Some("Radiative forcing"));

    assert_eq!(api.composite("forcing", DayId::new(2020, 40)).unwrap(), Outcome::NoInput);

    // Windows start on days 5, 12, 19, ...; only the first two see mosaics
    let report = api.composite_year("forcing", 2020).unwrap();
    assert_eq!(report.written.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(report.total(), 52);
}

#[test]
fn composite_rejects_mixed_nodata() {
    let root = tempfile::tempdir().unwrap();
    write_daily_mosaic(root.path(), 5, vec![1.0, 2.0, 3.0, 4.0], NODATA);
    write_daily_mosaic(root.path(), 6, vec![1.0, 2.0, 3.0, 4.0], 0.0);

    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    let result = api.composite("forcing", DayId::new(2020, 5));
    assert!(matches!(result, Err(PipelineError::IncompatibleGeometry(_))));
}

#[test]
fn unknown_source_type_is_a_config_error() {
    let root = tempfile::tempdir().unwrap();
    let api = SnowMosaic::new(geographic_config(), root.path()).unwrap();
    assert!(matches!(api.mosaic_day("swe", DayId::new(2020, 1)), Err(PipelineError::Config(_))));
}
