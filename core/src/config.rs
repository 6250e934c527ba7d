use crate::math::ScaleFactor;
use crate::overlay::{ContourLevels, DEFAULT_CONTOUR_LEVELS};
use crate::prelude::{CoverageError, CoverageResult};
use crate::reader::{ReaderDescriptor, ReaderSet, DEFAULT_RADIUS_M};
use crate::render::DEFAULT_HEATMAP_ALPHA;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_FLOORPLAN: &str = "CN4_1F RFID_page-0001.jpg";

/// Site description: floorplan, scale and reader layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub floorplan: PathBuf,
    pub pixels_per_meter: f64,
    pub default_radius_m: f64,
    pub contour_levels: Vec<f64>,
    pub heatmap_alpha: f64,
    /// Overrides the bundled label font.
    pub label_font: Option<PathBuf>,
    /// Explicit layout; `None` falls back to the built-in readers.
    pub readers: Option<Vec<ReaderEntry>>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            floorplan: PathBuf::from(DEFAULT_FLOORPLAN),
            pixels_per_meter: ScaleFactor::DEFAULT_PIXELS_PER_METER,
            default_radius_m: DEFAULT_RADIUS_M,
            contour_levels: DEFAULT_CONTOUR_LEVELS.to_vec(),
            heatmap_alpha: DEFAULT_HEATMAP_ALPHA,
            label_font: None,
            readers: None,
        }
    }
}

impl SiteConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> CoverageResult<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|e| {
            CoverageError::Config(format!("reading site config {}: {e}", path_ref.display()))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            CoverageError::Config(format!("parsing site config {}: {e}", path_ref.display()))
        })
    }

    pub fn scale(&self) -> CoverageResult<ScaleFactor> {
        ScaleFactor::new(self.pixels_per_meter)
    }

    pub fn contour_levels(&self) -> CoverageResult<ContourLevels> {
        ContourLevels::new(self.contour_levels.clone())
    }

    /// Readers from the configured list, or the defaults when none is given.
    pub fn reader_set(&self) -> CoverageResult<ReaderSet> {
        match &self.readers {
            Some(entries) => ReaderSet::new(
                entries
                    .iter()
                    .map(|entry| entry.to_descriptor(self.default_radius_m))
                    .collect(),
            ),
            None => Ok(ReaderSet::defaults(self.default_radius_m)),
        }
    }
}

/// One configured reader. The radius falls back to the site default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderEntry {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub radius_m: Option<f64>,
}

impl ReaderEntry {
    pub fn to_descriptor(&self, default_radius_m: f64) -> ReaderDescriptor {
        ReaderDescriptor::new(
            self.id.clone(),
            self.x,
            self.y,
            self.radius_m.unwrap_or(default_radius_m),
        )
    }
}

impl From<&ReaderDescriptor> for ReaderEntry {
    fn from(reader: &ReaderDescriptor) -> Self {
        Self {
            id: reader.id.clone(),
            x: reader.position.x,
            y: reader.position.y,
            radius_m: Some(reader.radius_meters),
        }
    }
}

/// Parses `ID=X,Y` or `ID=X,Y,R`.
impl FromStr for ReaderEntry {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoverageError::Config(format!("expected ID=X,Y[,R], got {s:?}"));
        let (id, values) = s.split_once('=').ok_or_else(bad)?;
        let id = id.trim();
        if id.is_empty() {
            return Err(bad());
        }
        let numbers = values
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad())?;
        match numbers.as_slice() {
            [x, y] => Ok(Self {
                id: id.to_string(),
                x: *x,
                y: *y,
                radius_m: None,
            }),
            [x, y, r] => Ok(Self {
                id: id.to_string(),
                x: *x,
                y: *y,
                radius_m: Some(*r),
            }),
            _ => Err(bad()),
        }
    }
}
