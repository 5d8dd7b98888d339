//! Error and outcome types of the mosaic and composite pipeline

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::tiff::errors::TiffError;

/// Errors raised while building mosaics or composites
#[derive(Debug)]
pub enum PipelineError {
    /// A tile or daily mosaic could not be opened or decoded
    UnreadableRaster { path: PathBuf, reason: String },
    /// Rasters that must line up do not (pixel size, grid or no-data value)
    IncompatibleGeometry(String),
    /// Invalid configuration or command line value
    Config(String),
    /// Raster codec failure while writing or warping
    Raster(TiffError),
    /// File system error outside the raster codec
    Io(io::Error),
    /// Some days of a batch failed; each was logged when it happened
    BatchFailed { failed: usize, total: usize },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::UnreadableRaster { path, reason } => {
                write!(f, "Unreadable raster {}: {}", path.display(), reason)
            },
            PipelineError::IncompatibleGeometry(msg) => write!(f, "Incompatible geometry: {}", msg),
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PipelineError::Raster(e) => write!(f, "{}", e),
            PipelineError::Io(e) => write!(f, "I/O error: {}", e),
            PipelineError::BatchFailed { failed, total } => write!(f, "{} of {} days failed", failed, total),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Raster(e) => Some(e),
            PipelineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TiffError> for PipelineError {
    fn from(error: TiffError) -> Self {
        PipelineError::Raster(error)
    }
}

impl From<io::Error> for PipelineError {
    fn from(error: io::Error) -> Self {
        PipelineError::Io(error)
    }
}

impl PipelineError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        PipelineError::UnreadableRaster { path: path.into(), reason: reason.to_string() }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// What a mosaic or composite run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A raster was written to this path
    Written(PathBuf),
    /// There was nothing to process
    NoInput,
}
