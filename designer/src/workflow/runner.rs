use crate::workflow::config::DesignerConfig;
use anyhow::Context;
use log::warn;
use rfidcore::floorplan::Floorplan;
use rfidcore::overlay::OverlaySet;
use rfidcore::prelude::GridSize;
use rfidcore::reader::ReaderDescriptor;
use rfidcore::render::{export_png, legend_strip, load_label_font};
use rfidcore::session::{CoverageFrame, CoverageSession};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const LEGEND_SIZE: (u32, u32) = (512, 40);

/// Share of the floorplan at or above one contour level.
#[derive(Debug, Clone, Serialize)]
pub struct LevelCoverage {
    pub level: f64,
    pub fraction: f64,
}

/// Machine-readable dump of one composed frame.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub grid: GridSize,
    pub pixels_per_meter: f64,
    pub readers: Vec<ReaderDescriptor>,
    pub coverage: Vec<LevelCoverage>,
    pub degraded: bool,
    pub notes: Vec<String>,
    pub overlays: OverlaySet,
}

pub struct WorkflowResult {
    pub floorplan: Floorplan,
    pub session: CoverageSession,
    pub frame: Arc<CoverageFrame>,
    pub coverage: Vec<LevelCoverage>,
}

impl WorkflowResult {
    pub fn report(&self) -> CoverageReport {
        CoverageReport {
            grid: self.session.grid(),
            pixels_per_meter: self.session.scale().pixels_per_meter(),
            readers: self.session.readers().as_slice().to_vec(),
            coverage: self.coverage.clone(),
            degraded: self.frame.degraded,
            notes: self.frame.notes.clone(),
            overlays: self.frame.overlays.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Runner {
    config: DesignerConfig,
}

impl Runner {
    pub fn new(config: DesignerConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let site = &self.config.site;
        let floorplan = Floorplan::load(&site.floorplan).context("loading floorplan")?;
        self.execute_on(floorplan)
    }

    /// Runs against an already decoded floorplan.
    pub fn execute_on(&self, floorplan: Floorplan) -> anyhow::Result<WorkflowResult> {
        let site = &self.config.site;
        let mut session = CoverageSession::from_config(site, floorplan.grid())
            .context("building coverage session")?;
        let frame = session.frame();

        let coverage = session
            .levels()
            .map(|levels| {
                levels
                    .iter()
                    .map(|level| LevelCoverage {
                        level,
                        fraction: frame.field.coverage_fraction(level),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(WorkflowResult {
            floorplan,
            session,
            frame,
            coverage,
        })
    }

    /// Writes the composed view. A configured but unusable font falls back to
    /// the bundled one.
    pub fn export(&self, result: &mut WorkflowResult, path: &Path) -> anyhow::Result<()> {
        let font = match &self.config.site.label_font {
            Some(font_path) => match load_label_font(font_path) {
                Ok(font) => Some(font),
                Err(err) => {
                    warn!("using bundled label font: {}", err);
                    None
                }
            },
            None => None,
        };
        result
            .session
            .export(result.floorplan.image(), path, font.as_ref())
            .context("exporting coverage view")
    }

    pub fn write_legend(&self, path: &Path) -> anyhow::Result<()> {
        let strip = legend_strip(LEGEND_SIZE.0, LEGEND_SIZE.1);
        export_png(&strip, path).context("writing legend strip")
    }

    pub fn write_report(&self, result: &WorkflowResult, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&result.report())
            .context("serializing coverage report")?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use rfidcore::config::{ReaderEntry, SiteConfig};
    use tempfile::tempdir;

    fn config_for(floorplan: &Path) -> DesignerConfig {
        DesignerConfig::from_site(SiteConfig {
            floorplan: floorplan.to_path_buf(),
            pixels_per_meter: 0.5,
            readers: Some(vec![
                ReaderEntry {
                    id: "01".into(),
                    x: 16.0,
                    y: 16.0,
                    radius_m: Some(30.0),
                },
                ReaderEntry {
                    id: "02".into(),
                    x: 48.0,
                    y: 30.0,
                    radius_m: Some(40.0),
                },
            ]),
            ..Default::default()
        })
    }

    fn write_floorplan(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("plan.png");
        RgbaImage::from_pixel(64, 48, Rgba([240, 240, 240, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn runner_executes_workflow() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(config_for(&write_floorplan(dir.path())));
        let result = runner.execute().unwrap();

        assert_eq!(result.frame.field.width(), 64);
        assert_eq!(result.frame.field.height(), 48);
        assert_eq!(result.frame.field.max(), 1.0);
        assert_eq!(result.coverage.len(), 4);
        assert!(result
            .coverage
            .windows(2)
            .all(|pair| pair[0].fraction >= pair[1].fraction));
    }

    #[test]
    fn missing_floorplan_is_fatal() {
        let runner = Runner::new(config_for(Path::new("missing/plan.png")));
        assert!(runner.execute().is_err());
    }

    #[test]
    fn runner_writes_export_legend_and_report() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(config_for(&write_floorplan(dir.path())));
        let mut result = runner.execute().unwrap();

        let export = dir.path().join("out").join("coverage.png");
        runner.export(&mut result, &export).unwrap();
        assert_eq!(image::open(&export).unwrap().width(), 64);

        let legend = dir.path().join("legend.png");
        runner.write_legend(&legend).unwrap();
        assert_eq!(image::open(&legend).unwrap().width(), LEGEND_SIZE.0);

        let report = dir.path().join("report.json");
        runner.write_report(&result, &report).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["overlays"]["markers"].as_array().unwrap().len(), 2);
        assert_eq!(json["grid"]["width"], 64);
    }
}
