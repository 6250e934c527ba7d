use crate::prelude::{CoverageError, CoverageResult, GridSize};
use image::RgbaImage;
use log::info;
use std::path::{Path, PathBuf};

/// Decoded background image. Its pixel dimensions define the coordinate
/// space for readers and the field grid.
#[derive(Debug, Clone)]
pub struct Floorplan {
    path: PathBuf,
    image: RgbaImage,
}

impl Floorplan {
    pub fn load(path: &Path) -> CoverageResult<Self> {
        let image = image::open(path)
            .map_err(|e| CoverageError::FloorplanMissing {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .into_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(CoverageError::FloorplanMissing {
                path: path.to_path_buf(),
                reason: "image has no pixels".into(),
            });
        }
        info!(
            "Loaded floorplan {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn grid(&self) -> GridSize {
        GridSize::new(self.image.width() as usize, self.image.height() as usize)
    }
}
