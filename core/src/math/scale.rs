use crate::prelude::{CoverageError, CoverageResult};
use serde::{Deserialize, Serialize};

/// Pixels-per-meter conversion for one floorplan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub const DEFAULT_PIXELS_PER_METER: f64 = 11871.0;

    pub fn new(pixels_per_meter: f64) -> CoverageResult<Self> {
        if pixels_per_meter.is_finite() && pixels_per_meter > 0.0 {
            Ok(Self(pixels_per_meter))
        } else {
            Err(CoverageError::InvalidScale(pixels_per_meter))
        }
    }

    pub fn pixels_per_meter(self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(Self::DEFAULT_PIXELS_PER_METER)
    }
}

impl TryFrom<f64> for ScaleFactor {
    type Error = CoverageError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScaleFactor> for f64 {
    fn from(scale: ScaleFactor) -> Self {
        scale.0
    }
}
