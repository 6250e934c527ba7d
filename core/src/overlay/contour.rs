use crate::field::ScalarField;
use crate::overlay::geometry::ContourLine;
use crate::prelude::{CoverageError, CoverageResult};
use crate::reader::PixelPoint;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub const DEFAULT_CONTOUR_LEVELS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// Iso-strength thresholds, strictly increasing and inside (0, 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ContourLevels(Vec<f64>);

impl ContourLevels {
    pub fn new(levels: Vec<f64>) -> CoverageResult<Self> {
        if let Some(bad) = levels.iter().find(|&&l| !(l > 0.0 && l < 1.0)) {
            return Err(CoverageError::InvalidContourLevels(format!(
                "level {bad} is outside (0, 1)"
            )));
        }
        if let Some(pair) = levels.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(CoverageError::InvalidContourLevels(format!(
                "levels must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self(levels))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl Default for ContourLevels {
    fn default() -> Self {
        Self(DEFAULT_CONTOUR_LEVELS.to_vec())
    }
}

impl TryFrom<Vec<f64>> for ContourLevels {
    type Error = CoverageError;

    fn try_from(levels: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<ContourLevels> for Vec<f64> {
    fn from(levels: ContourLevels) -> Self {
        levels.0
    }
}

/// Grid edge between two neighbouring samples. Each edge is shared by at
/// most two cells, which is what lets segments be stitched by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum EdgeKey {
    /// Between (row, col) and (row, col + 1).
    Horizontal { row: usize, col: usize },
    /// Between (row, col) and (row + 1, col).
    Vertical { row: usize, col: usize },
}

type Segment = (EdgeKey, EdgeKey);

/// Extracts every contour polyline for each level, in level order.
pub fn extract_contours(field: &ScalarField, levels: &ContourLevels) -> Vec<ContourLine> {
    levels
        .iter()
        .flat_map(|level| extract_level(field.as_array(), level))
        .collect()
}

fn extract_level(values: &Array2<f64>, level: f64) -> Vec<ContourLine> {
    let (rows, cols) = values.dim();
    if rows < 2 || cols < 2 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            cell_segments(values, row, col, level, &mut segments);
        }
    }

    stitch(&segments)
        .into_iter()
        .map(|(edges, closed)| ContourLine {
            level,
            points: edges
                .iter()
                .map(|&edge| crossing(values, edge, level))
                .collect(),
            closed,
        })
        .collect()
}

/// Marching-squares case for one cell, corners weighted tl=8 tr=4 br=2 bl=1.
fn cell_segments(
    values: &Array2<f64>,
    row: usize,
    col: usize,
    level: f64,
    out: &mut Vec<Segment>,
) {
    let tl = values[[row, col]];
    let tr = values[[row, col + 1]];
    let br = values[[row + 1, col + 1]];
    let bl = values[[row + 1, col]];

    let case = (u8::from(tl >= level) << 3)
        | (u8::from(tr >= level) << 2)
        | (u8::from(br >= level) << 1)
        | u8::from(bl >= level);

    let top = EdgeKey::Horizontal { row, col };
    let bottom = EdgeKey::Horizontal { row: row + 1, col };
    let left = EdgeKey::Vertical { row, col };
    let right = EdgeKey::Vertical { row, col: col + 1 };

    match case {
        0 | 15 => {}
        1 | 14 => out.push((left, bottom)),
        2 | 13 => out.push((bottom, right)),
        3 | 12 => out.push((left, right)),
        4 | 11 => out.push((top, right)),
        6 | 9 => out.push((top, bottom)),
        7 | 8 => out.push((top, left)),
        5 | 10 => {
            let center_high = (tl + tr + br + bl) / 4.0 >= level;
            // case 5 has tr and bl high, case 10 has tl and br high
            let cut_top_left = (case == 5) == center_high;
            if cut_top_left {
                out.push((top, left));
                out.push((bottom, right));
            } else {
                out.push((top, right));
                out.push((left, bottom));
            }
        }
        _ => unreachable!("marching squares case out of range"),
    }
}

fn crossing(values: &Array2<f64>, edge: EdgeKey, level: f64) -> PixelPoint {
    match edge {
        EdgeKey::Horizontal { row, col } => {
            let t = interpolate(values[[row, col]], values[[row, col + 1]], level);
            PixelPoint::new(col as f64 + t, row as f64)
        }
        EdgeKey::Vertical { row, col } => {
            let t = interpolate(values[[row, col]], values[[row + 1, col]], level);
            PixelPoint::new(col as f64, row as f64 + t)
        }
    }
}

fn interpolate(a: f64, b: f64, level: f64) -> f64 {
    let span = b - a;
    if span == 0.0 {
        return 0.5;
    }
    ((level - a) / span).clamp(0.0, 1.0)
}

/// Chains segments sharing an edge into polylines. Open chains (touching the
/// grid border) come first, then closed loops.
fn stitch(segments: &[Segment]) -> Vec<(Vec<EdgeKey>, bool)> {
    let mut incident: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (idx, &(a, b)) in segments.iter().enumerate() {
        incident.entry(a).or_default().push(idx);
        incident.entry(b).or_default().push(idx);
    }

    let open_ends: BTreeSet<EdgeKey> = incident
        .iter()
        .filter(|(_, segs)| segs.len() == 1)
        .map(|(&edge, _)| edge)
        .collect();

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    for start in open_ends {
        let chain = walk(start, segments, &incident, &mut used);
        if chain.len() > 1 {
            chains.push((chain, false));
        }
    }

    for idx in 0..segments.len() {
        if used[idx] {
            continue;
        }
        let mut chain = walk(segments[idx].0, segments, &incident, &mut used);
        if chain.len() > 2 && chain.first() == chain.last() {
            chain.pop();
            chains.push((chain, true));
        } else if chain.len() > 1 {
            chains.push((chain, false));
        }
    }

    chains
}

fn walk(
    start: EdgeKey,
    segments: &[Segment],
    incident: &HashMap<EdgeKey, Vec<usize>>,
    used: &mut [bool],
) -> Vec<EdgeKey> {
    let mut chain = vec![start];
    let mut current = start;
    loop {
        let next_segment = incident
            .get(&current)
            .and_then(|segs| segs.iter().copied().find(|&idx| !used[idx]));
        let Some(idx) = next_segment else {
            break;
        };
        used[idx] = true;
        let (a, b) = segments[idx];
        current = if a == current { b } else { a };
        chain.push(current);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{compose, FALLOFF_SHAPE};
    use crate::reader::ReaderDescriptor;

    #[test]
    fn default_levels_are_valid() {
        let levels = ContourLevels::default();
        assert_eq!(levels.as_slice(), &[0.2, 0.4, 0.6, 0.8]);
        assert!(ContourLevels::new(levels.as_slice().to_vec()).is_ok());
    }

    #[test]
    fn rejects_non_monotonic_or_out_of_range_levels() {
        for bad in [
            vec![0.4, 0.2],
            vec![0.2, 0.2],
            vec![0.0, 0.5],
            vec![0.5, 1.0],
            vec![f64::NAN],
        ] {
            assert!(
                matches!(
                    ContourLevels::new(bad.clone()),
                    Err(CoverageError::InvalidContourLevels(_))
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn single_gaussian_rings_match_analytic_radii() {
        // r_px = 80, sigma = 32
        let center = 100.0;
        let reader = ReaderDescriptor::new("01", center, center, 80.0);
        let field = compose(&[reader], 201, 201, 1.0);
        let sigma = 80.0 / FALLOFF_SHAPE;

        let contours = extract_contours(&field, &ContourLevels::default());
        assert_eq!(contours.len(), 4);

        for line in &contours {
            assert!(line.closed, "ring at {} is not closed", line.level);
            assert!(line.points.len() > 16);
            let expected = sigma * (-2.0 * line.level.ln()).sqrt();
            for point in &line.points {
                let radius = (point.x - center).hypot(point.y - center);
                assert!(
                    (radius - expected).abs() < 0.5,
                    "level {} radius {radius} expected {expected}",
                    line.level
                );
            }
        }
    }

    #[test]
    fn contour_cut_by_border_is_open() {
        let reader = ReaderDescriptor::new("01", 0.0, 20.0, 30.0);
        let field = compose(&[reader], 40, 40, 1.0);
        let levels = ContourLevels::new(vec![0.5]).unwrap();
        let contours = extract_contours(&field, &levels);
        assert_eq!(contours.len(), 1);
        let line = &contours[0];
        assert!(!line.closed);
        let first = line.points.first().unwrap();
        let last = line.points.last().unwrap();
        assert_eq!(first.x, 0.0);
        assert_eq!(last.x, 0.0);
    }

    #[test]
    fn flat_or_tiny_fields_produce_no_contours() {
        let levels = ContourLevels::default();
        assert!(extract_contours(&ScalarField::zeros(20, 20), &levels).is_empty());
        assert!(extract_contours(&ScalarField::zeros(1, 20), &levels).is_empty());
    }

    #[test]
    fn saddle_cell_emits_two_segments() {
        let values = ndarray::array![[0.0, 1.0], [1.0, 0.0]];
        let mut segments = Vec::new();
        cell_segments(&values, 0, 0, 0.5, &mut segments);
        assert_eq!(segments.len(), 2);
    }
}
