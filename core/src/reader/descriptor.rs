use crate::prelude::{CoverageError, CoverageResult, GridSize};
use serde::{Deserialize, Serialize};

pub const RADIUS_MIN_M: f64 = 30.0;
pub const RADIUS_MAX_M: f64 = 100.0;
pub const RADIUS_STEP_M: f64 = 5.0;
pub const DEFAULT_RADIUS_M: f64 = 75.0;

/// A location in image-pixel space (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// One physical reader: a labelled emitter with a nominal coverage radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderDescriptor {
    pub id: String,
    pub position: PixelPoint,
    pub radius_meters: f64,
}

impl ReaderDescriptor {
    pub fn new(id: impl Into<String>, x: f64, y: f64, radius_meters: f64) -> Self {
        Self {
            id: id.into(),
            position: PixelPoint::new(x, y),
            radius_meters,
        }
    }

    /// Nominal radius converted into pixel space. Every meters-to-pixels
    /// conversion of a reader radius goes through here.
    pub fn radius_px(&self, pixels_per_meter: f64) -> f64 {
        self.radius_meters * pixels_per_meter
    }

    /// Checks the descriptor against the floorplan bounds.
    pub fn validate(&self, grid: GridSize) -> CoverageResult<()> {
        if self.id.trim().is_empty() {
            return Err(CoverageError::InvalidReader("reader id is empty".into()));
        }
        let PixelPoint { x, y } = self.position;
        if !x.is_finite() || !y.is_finite() {
            return Err(CoverageError::InvalidReader(format!(
                "reader {} has a non-finite position",
                self.id
            )));
        }
        if x < 0.0 || y < 0.0 || x > grid.width as f64 || y > grid.height as f64 {
            return Err(CoverageError::InvalidReader(format!(
                "reader {} at ({}, {}) lies outside {}x{}",
                self.id, x, y, grid.width, grid.height
            )));
        }
        if !(self.radius_meters.is_finite() && self.radius_meters > 0.0) {
            return Err(CoverageError::InvalidReader(format!(
                "reader {} has non-finite or non-positive radius {}",
                self.id, self.radius_meters
            )));
        }
        Ok(())
    }
}

/// Clamps a radius into the slider range and rounds it onto the 5 m grid.
pub fn snap_radius(meters: f64) -> f64 {
    if !meters.is_finite() {
        return DEFAULT_RADIUS_M;
    }
    let clamped = meters.clamp(RADIUS_MIN_M, RADIUS_MAX_M);
    let steps = ((clamped - RADIUS_MIN_M) / RADIUS_STEP_M).round();
    (RADIUS_MIN_M + steps * RADIUS_STEP_M).min(RADIUS_MAX_M)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_px_uses_scale() {
        let reader = ReaderDescriptor::new("01", 510.0, 1910.0, 75.0);
        assert_eq!(reader.radius_px(11871.0), 890_325.0);
    }

    #[test]
    fn validate_rejects_out_of_bounds_position() {
        let grid = GridSize::new(100, 50);
        let reader = ReaderDescriptor::new("02", 101.0, 10.0, 50.0);
        assert!(matches!(
            reader.validate(grid),
            Err(CoverageError::InvalidReader(_))
        ));
        let edge = ReaderDescriptor::new("03", 100.0, 50.0, 50.0);
        assert!(edge.validate(grid).is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_radius() {
        let grid = GridSize::new(100, 100);
        let reader = ReaderDescriptor::new("04", 10.0, 10.0, 0.0);
        assert!(reader.validate(grid).is_err());
        let reader = ReaderDescriptor::new("05", 10.0, 10.0, f64::NAN);
        match reader.validate(grid) {
            Err(CoverageError::InvalidReader(msg)) => {
                assert!(msg.contains("non-finite or non-positive radius NaN"), "{msg}")
            }
            other => panic!("expected InvalidReader, got {other:?}"),
        }
    }

    #[test]
    fn snap_radius_clamps_and_rounds() {
        assert_eq!(snap_radius(12.0), 30.0);
        assert_eq!(snap_radius(140.0), 100.0);
        assert_eq!(snap_radius(62.4), 60.0);
        assert_eq!(snap_radius(63.0), 65.0);
        assert_eq!(snap_radius(f64::NAN), DEFAULT_RADIUS_M);
    }
}
