use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::field::ScalarField;
pub use crate::math::ScaleFactor;
pub use crate::overlay::{ContourLevels, OverlaySet};
pub use crate::reader::{ReaderDescriptor, ReaderSet};

/// Pixel dimensions of the floorplan, which double as the field grid shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Common error type for coverage computation and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum CoverageError {
    #[error("floorplan {path} could not be loaded: {reason}")]
    FloorplanMissing { path: PathBuf, reason: String },
    #[error("invalid reader: {0}")]
    InvalidReader(String),
    #[error("invalid scale: {0} pixels per meter")]
    InvalidScale(f64),
    #[error("invalid contour levels: {0}")]
    InvalidContourLevels(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("export to {path} failed: {reason}")]
    Export { path: PathBuf, reason: String },
}

pub type CoverageResult<T> = Result<T, CoverageError>;
