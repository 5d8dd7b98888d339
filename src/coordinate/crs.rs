//! Coordinate Reference System handling

use std::fmt;

use crate::tiff::errors::{TiffError, TiffResult};

/// Coordinate systems the pipeline can read, write and transform between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS 84 (EPSG:4326)
    WGS84,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// UTM Zone (EPSG:326xx for northern hemisphere, 327xx for southern)
    UTM(u8, bool),
    /// Sinusoidal projection on the authalic sphere used by the MODIS land grid
    ModisSinusoidal,
    /// Other EPSG code
    Other(u32),
}

impl CoordinateSystem {
    /// EPSG code, if the system has one
    pub fn epsg_code(&self) -> Option<u32> {
        match self {
            CoordinateSystem::WGS84 => Some(4326),
            CoordinateSystem::WebMercator => Some(3857),
            CoordinateSystem::UTM(zone, is_northern) => {
                if *is_northern {
                    Some(32600 + *zone as u32)
                } else {
                    Some(32700 + *zone as u32)
                }
            },
            CoordinateSystem::ModisSinusoidal => None,
            CoordinateSystem::Other(code) => Some(*code),
        }
    }

    /// Whether coordinates are longitude/latitude in degrees
    pub fn is_geographic(&self) -> bool {
        match self {
            CoordinateSystem::WGS84 => true,
            CoordinateSystem::Other(code) => (4000..5000).contains(code),
            _ => false,
        }
    }

    pub fn description(&self) -> String {
        match self {
            CoordinateSystem::WGS84 => "WGS 84 (EPSG:4326)".to_string(),
            CoordinateSystem::WebMercator => "Web Mercator (EPSG:3857)".to_string(),
            CoordinateSystem::UTM(zone, is_northern) => format!(
                "UTM Zone {}{} (EPSG:{})",
                zone,
                if *is_northern { "N" } else { "S" },
                self.epsg_code().unwrap_or_default()
            ),
            CoordinateSystem::ModisSinusoidal => "MODIS Sinusoidal".to_string(),
            CoordinateSystem::Other(code) => format!("EPSG:{}", code),
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Factory for creating coordinate systems
pub struct CoordinateSystemFactory;

impl CoordinateSystemFactory {
    pub fn from_epsg(epsg: u32) -> CoordinateSystem {
        match epsg {
            4326 => CoordinateSystem::WGS84,
            3857 => CoordinateSystem::WebMercator,
            32601..=32660 => CoordinateSystem::UTM((epsg - 32600) as u8, true),
            32701..=32760 => CoordinateSystem::UTM((epsg - 32700) as u8, false),
            _ => CoordinateSystem::Other(epsg),
        }
    }

    /// Parse a coordinate system name such as "EPSG:4326", "4326" or "modis-sinusoidal"
    pub fn from_string(crs_str: &str) -> TiffResult<CoordinateSystem> {
        let crs_str = crs_str.trim().to_uppercase();

        if let Some(epsg_str) = crs_str.strip_prefix("EPSG:") {
            epsg_str.parse::<u32>()
                .map(Self::from_epsg)
                .map_err(|_| TiffError::GenericError(format!("Invalid EPSG code: {}", epsg_str)))
        } else if let Ok(epsg) = crs_str.parse::<u32>() {
            Ok(Self::from_epsg(epsg))
        } else {
            match crs_str.as_str() {
                "MODIS-SINUSOIDAL" | "MODIS_SINUSOIDAL" | "SINUSOIDAL" => Ok(CoordinateSystem::ModisSinusoidal),
                "WGS84" => Ok(CoordinateSystem::WGS84),
                _ => Err(TiffError::GenericError(format!("Unsupported CRS format: {}", crs_str))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_codes() {
        assert_eq!(CoordinateSystemFactory::from_string("EPSG:4326").unwrap(), CoordinateSystem::WGS84);
        assert_eq!(CoordinateSystemFactory::from_string("32633").unwrap(), CoordinateSystem::UTM(33, true));
        assert_eq!(CoordinateSystemFactory::from_string("modis-sinusoidal").unwrap(), CoordinateSystem::ModisSinusoidal);
        assert!(CoordinateSystemFactory::from_string("EPSG:abc").is_err());
        assert!(CoordinateSystemFactory::from_string("lambert").is_err());
    }

    #[test]
    fn sinusoidal_has_no_epsg_code() {
        assert_eq!(CoordinateSystem::ModisSinusoidal.epsg_code(), None);
        assert!(!CoordinateSystem::ModisSinusoidal.is_geographic());
        assert!(CoordinateSystem::Other(4269).is_geographic());
    }
}
