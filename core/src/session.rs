//! Interactive session state: the mutable reader set plus a single-entry
//! frame cache keyed on every input of the pure field/overlay pipeline.

use crate::config::SiteConfig;
use crate::field::{compose, ScalarField};
use crate::math::ScaleFactor;
use crate::overlay::{
    render_markers_and_rings, render_overlays_with_levels, ContourLevels, OverlaySet,
};
use crate::prelude::{CoverageResult, GridSize};
use crate::reader::{snap_radius, ReaderSet};
use crate::render::{export_png, render_view};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use ab_glyph::FontVec;
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

/// One recomputation: the normalized field and everything drawn over it.
#[derive(Debug, Clone)]
pub struct CoverageFrame {
    pub field: ScalarField,
    pub overlays: OverlaySet,
    /// Set when part of the pipeline was skipped and a fallback was used.
    pub degraded: bool,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct FrameKey {
    readers: ReaderSet,
    grid: GridSize,
    scale: ScaleFactor,
}

#[derive(Clone)]
pub struct CoverageSession {
    readers: ReaderSet,
    scale: ScaleFactor,
    grid: GridSize,
    levels: Option<ContourLevels>,
    heatmap_alpha: f64,
    cache: Option<(FrameKey, Arc<CoverageFrame>)>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl CoverageSession {
    pub fn new(readers: ReaderSet, scale: ScaleFactor, grid: GridSize) -> Self {
        Self {
            readers,
            scale,
            grid,
            levels: Some(ContourLevels::default()),
            heatmap_alpha: crate::render::DEFAULT_HEATMAP_ALPHA,
            cache: None,
            logger: LogManager::new("session"),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Builds a session for a loaded floorplan. Bad scale or reader layout is
    /// fatal; bad contour levels only disable the iso-lines.
    pub fn from_config(config: &SiteConfig, grid: GridSize) -> CoverageResult<Self> {
        let readers = config.reader_set()?;
        readers.validate(grid)?;
        let mut session = Self::new(readers, config.scale()?, grid);
        session.heatmap_alpha = config.heatmap_alpha;
        session.levels = match config.contour_levels() {
            Ok(levels) => Some(levels),
            Err(err) => {
                session
                    .logger
                    .degrade(&format!("contours disabled: {err}"));
                None
            }
        };
        Ok(session)
    }

    pub fn readers(&self) -> &ReaderSet {
        &self.readers
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    /// Active contour levels, `None` when the configured list was rejected.
    pub fn levels(&self) -> Option<&ContourLevels> {
        self.levels.as_ref()
    }

    pub fn heatmap_alpha(&self) -> f64 {
        self.heatmap_alpha
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    /// Moves a reader, clamping into the floorplan. Returns false for an
    /// unknown id.
    pub fn set_position(&mut self, id: &str, x: f64, y: f64) -> bool {
        let (max_x, max_y) = (self.grid.width as f64, self.grid.height as f64);
        match self.readers.get_mut(id) {
            Some(reader) => {
                reader.position.x = clamp_or_zero(x, max_x);
                reader.position.y = clamp_or_zero(y, max_y);
                true
            }
            None => false,
        }
    }

    /// Sets a reader's radius, snapped onto the 30–100 m / 5 m slider grid.
    pub fn set_radius(&mut self, id: &str, meters: f64) -> bool {
        match self.readers.get_mut(id) {
            Some(reader) => {
                reader.radius_meters = snap_radius(meters);
                true
            }
            None => false,
        }
    }

    /// Field and overlays for the current parameters. Unchanged parameters
    /// return the cached frame.
    pub fn frame(&mut self) -> Arc<CoverageFrame> {
        let key = FrameKey {
            readers: self.readers.clone(),
            grid: self.grid,
            scale: self.scale,
        };
        if let Some((cached_key, frame)) = &self.cache {
            if *cached_key == key {
                self.metrics.record_cache_hit();
                return Arc::clone(frame);
            }
        }

        let frame = Arc::new(self.compute());
        self.metrics.record_frame();
        if frame.degraded {
            self.metrics.record_degraded();
        }
        self.cache = Some((key, Arc::clone(&frame)));
        frame
    }

    /// Markers and rings for the current readers, with contours from the last
    /// composed frame. Cheap enough to call on every slider step.
    pub fn live_overlays(&self) -> OverlaySet {
        let mut overlays =
            render_markers_and_rings(self.readers.as_slice(), self.scale.pixels_per_meter());
        if let Some((_, frame)) = &self.cache {
            overlays.contours = frame.overlays.contours.clone();
        }
        overlays
    }

    fn compute(&self) -> CoverageFrame {
        let GridSize { width, height } = self.grid;
        let ppm = self.scale.pixels_per_meter();
        let readers = self.readers.as_slice();

        if let Err(err) = self.readers.validate(self.grid) {
            let note = format!("readers rejected, showing empty field: {err}");
            self.logger.degrade(&note);
            return CoverageFrame {
                field: ScalarField::zeros(width, height),
                overlays: OverlaySet::default(),
                degraded: true,
                notes: vec![note],
            };
        }

        let field = compose(readers, width, height, ppm);
        let mut notes = Vec::new();
        let overlays = match &self.levels {
            Some(levels) => render_overlays_with_levels(&field, readers, ppm, levels),
            None => {
                notes.push("contour levels invalid, contours skipped".to_string());
                render_markers_and_rings(readers, ppm)
            }
        };
        if field.max() == 0.0 && !readers.is_empty() {
            notes.push("no reader contributes signal".to_string());
        }
        self.logger.record(&format!(
            "Composed {}x{} field for {} readers, {} contour lines",
            width,
            height,
            readers.len(),
            overlays.contours.len()
        ));

        CoverageFrame {
            field,
            overlays,
            degraded: self.levels.is_none(),
            notes,
        }
    }

    /// Renders the current view over `background` and writes it as PNG.
    pub fn export(
        &mut self,
        background: &RgbaImage,
        path: &Path,
        font: Option<&FontVec>,
    ) -> CoverageResult<()> {
        let frame = self.frame();
        let view = render_view(
            background,
            &frame.field,
            &frame.overlays,
            self.heatmap_alpha,
            font,
        );
        let result = export_png(&view, path);
        self.metrics.record_export(result.is_ok());
        match &result {
            Ok(()) => self.logger.record(&format!("Saved as {}", path.display())),
            Err(err) => self.logger.degrade(&format!("export failed: {err}")),
        }
        result
    }
}

fn clamp_or_zero(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReaderEntry;
    use crate::prelude::CoverageError;
    use crate::reader::ReaderDescriptor;
    use crate::render::EXPORT_FILE_NAME;
    use image::Rgba;
    use tempfile::{tempdir, NamedTempFile};

    fn session() -> CoverageSession {
        let readers = ReaderSet::new(vec![
            ReaderDescriptor::new("01", 10.0, 10.0, 30.0),
            ReaderDescriptor::new("02", 40.0, 25.0, 50.0),
        ])
        .unwrap();
        CoverageSession::new(readers, ScaleFactor::new(0.5).unwrap(), GridSize::new(60, 40))
    }

    #[test]
    fn setters_clamp_and_snap() {
        let mut s = session();
        assert!(s.set_position("01", -5.0, 400.0));
        assert!(s.set_radius("02", 73.0));
        assert!(!s.set_radius("99", 50.0));

        let first = s.readers().get("01").unwrap();
        assert_eq!((first.position.x, first.position.y), (0.0, 40.0));
        assert_eq!(s.readers().get("02").unwrap().radius_meters, 75.0);
    }

    #[test]
    fn unchanged_parameters_hit_the_cache() {
        let mut s = session();
        let first = s.frame();
        let second = s.frame();
        assert!(Arc::ptr_eq(&first, &second));

        s.set_radius("01", 60.0);
        let third = s.frame();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_ne!(first.field, third.field);

        let metrics = s.metrics();
        assert_eq!(metrics.frames_composed, 2);
        assert_eq!(metrics.cache_hits, 1);
    }

    #[test]
    fn live_overlays_track_readers_without_recomposing() {
        let mut s = session();
        let first = s.frame();
        assert!(s.set_position("01", 30.0, 20.0));
        assert!(s.set_radius("02", 60.0));

        let live = s.live_overlays();
        let marker = &live.markers[0];
        assert_eq!((marker.position.x, marker.position.y), (30.0, 20.0));
        assert_eq!(live.rings[0].center, marker.position);
        assert_eq!(live.rings[1].radius_px, 30.0);
        assert_eq!(live.contours, first.overlays.contours);
        assert_eq!(s.metrics().frames_composed, 1);
    }

    #[test]
    fn frame_carries_field_and_overlays() {
        let mut s = session();
        let frame = s.frame();
        assert!(!frame.degraded);
        assert_eq!(frame.field.max(), 1.0);
        assert_eq!(frame.overlays.markers.len(), 2);
        assert_eq!(frame.overlays.rings[1].radius_px, 25.0);
        assert!(!frame.overlays.contours.is_empty());
    }

    #[test]
    fn invalid_readers_degrade_to_empty_frame() {
        let readers = ReaderSet::new(vec![ReaderDescriptor::new("01", 500.0, 10.0, 30.0)]).unwrap();
        let mut s =
            CoverageSession::new(readers, ScaleFactor::new(1.0).unwrap(), GridSize::new(20, 20));
        let frame = s.frame();
        assert!(frame.degraded);
        assert_eq!(frame.field.max(), 0.0);
        assert!(frame.overlays.markers.is_empty());
        assert_eq!(s.metrics().degraded_frames, 1);
    }

    #[test]
    fn invalid_levels_from_config_skip_contours() {
        let config = SiteConfig {
            pixels_per_meter: 0.5,
            contour_levels: vec![0.8, 0.2],
            readers: Some(vec![ReaderEntry {
                id: "01".into(),
                x: 20.0,
                y: 20.0,
                radius_m: Some(30.0),
            }]),
            ..Default::default()
        };
        let mut s = CoverageSession::from_config(&config, GridSize::new(40, 40)).unwrap();
        let frame = s.frame();
        assert!(frame.degraded);
        assert!(frame.overlays.contours.is_empty());
        assert_eq!(frame.overlays.rings.len(), 1);
        assert_eq!(frame.field.max(), 1.0);
    }

    #[test]
    fn from_config_rejects_readers_outside_floorplan() {
        let config = SiteConfig::default();
        let err = CoverageSession::from_config(&config, GridSize::new(100, 100)).err();
        assert!(matches!(err, Some(CoverageError::InvalidReader(_))));
    }

    #[test]
    fn export_success_and_failure_are_counted() {
        let mut s = session();
        let background = RgbaImage::from_pixel(60, 40, Rgba([255, 255, 255, 255]));

        let dir = tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        s.export(&background, &path, None).unwrap();
        assert!(path.exists());

        let blocker = NamedTempFile::new().unwrap();
        let bad = blocker.path().join(EXPORT_FILE_NAME);
        assert!(s.export(&background, &bad, None).is_err());

        let metrics = s.metrics();
        assert_eq!((metrics.exports, metrics.export_failures), (1, 1));
    }
}
