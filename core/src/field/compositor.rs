use crate::math::stats::StatsHelper;
use crate::reader::ReaderDescriptor;
use ndarray::Array2;

/// Ratio between a reader's pixel radius and its Gaussian sigma. At the
/// nominal radius the falloff has decayed to exp(-2.5² / 2), roughly 4 %.
pub const FALLOFF_SHAPE: f64 = 2.5;

/// Normalized signal strength sampled once per pixel, rows indexed by y.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    values: Array2<f64>,
}

impl ScalarField {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            values: Array2::zeros((height, width)),
        }
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    /// Value at pixel (x, y), or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.values.get((y, x)).copied()
    }

    pub fn max(&self) -> f64 {
        StatsHelper::peak(self.values.iter())
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }

    /// Share of pixels whose strength reaches `level`.
    pub fn coverage_fraction(&self, level: f64) -> f64 {
        StatsHelper::fraction_at_or_above(self.values.iter(), level)
    }
}

/// Gaussian sigma in pixels, or `None` when the reader cannot contribute.
pub fn falloff_sigma(reader: &ReaderDescriptor, pixels_per_meter: f64) -> Option<f64> {
    let sigma = reader.radius_px(pixels_per_meter) / FALLOFF_SHAPE;
    (sigma.is_finite() && sigma > 0.0).then_some(sigma)
}

/// Sums each reader's Gaussian falloff over a `width` x `height` pixel grid
/// and normalizes the result so its peak is 1.0.
///
/// When nothing contributes (no readers, or every sigma degenerates) the
/// all-zero field is returned.
pub fn compose(
    readers: &[ReaderDescriptor],
    width: usize,
    height: usize,
    pixels_per_meter: f64,
) -> ScalarField {
    let mut values = Array2::<f64>::zeros((height, width));

    for reader in readers {
        let Some(sigma) = falloff_sigma(reader, pixels_per_meter) else {
            continue;
        };
        let (x0, y0) = (reader.position.x, reader.position.y);
        if !x0.is_finite() || !y0.is_finite() {
            continue;
        }
        let denom = 2.0 * sigma * sigma;
        for ((row, col), value) in values.indexed_iter_mut() {
            let dx = col as f64 - x0;
            let dy = row as f64 - y0;
            *value += (-(dx * dx + dy * dy) / denom).exp();
        }
    }

    let peak = StatsHelper::peak(values.iter());
    if !(peak.is_finite() && peak > 0.0) {
        return ScalarField::zeros(width, height);
    }
    values.mapv_inplace(|v| v / peak);

    ScalarField { values }
}
