use crate::overlay::{BoundaryRing, ContourLine, OverlaySet, ReaderMarker};
use crate::prelude::{CoverageError, CoverageResult};
use ab_glyph::{FontVec, PxScale};
use log::warn;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut,
};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Font used for reader labels in rasterized views.
pub type LabelFont = FontVec;

pub const MARKER_RADIUS_PX: i32 = 6;
pub const LABEL_SIZE_PX: f32 = 28.0;

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");

/// Display collaborator that draws overlay geometry onto some surface.
pub trait OverlayPainter {
    fn ring(&mut self, ring: &BoundaryRing);
    fn contour(&mut self, line: &ContourLine);
    fn marker(&mut self, marker: &ReaderMarker);
}

/// Draws rings, then contours, then markers so labels stay on top.
pub fn paint_overlays<P: OverlayPainter + ?Sized>(painter: &mut P, overlays: &OverlaySet) {
    for ring in &overlays.rings {
        painter.ring(ring);
    }
    for line in &overlays.contours {
        painter.contour(line);
    }
    for marker in &overlays.markers {
        painter.marker(marker);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub ring: Rgba<u8>,
    pub contour: Rgba<u8>,
    pub marker: Rgba<u8>,
    pub label: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            ring: Rgba([255, 255, 255, 255]),
            contour: Rgba([20, 20, 20, 255]),
            marker: Rgba([0, 128, 0, 255]),
            label: Rgba([0, 255, 0, 255]),
        }
    }
}

/// Paints overlays straight into an RGBA raster. Labels use the given font,
/// or the bundled DejaVu Sans Bold when none is passed.
pub struct RasterPainter<'a> {
    canvas: &'a mut RgbaImage,
    font: Option<&'a FontVec>,
    style: OverlayStyle,
}

impl<'a> RasterPainter<'a> {
    pub fn new(canvas: &'a mut RgbaImage, font: Option<&'a FontVec>) -> Self {
        Self {
            canvas,
            font: font.or(bundled_label_font()),
            style: OverlayStyle::default(),
        }
    }
}

impl OverlayPainter for RasterPainter<'_> {
    fn ring(&mut self, ring: &BoundaryRing) {
        let radius = ring.radius_px.round();
        if !radius.is_finite() || radius < 1.0 || radius > i32::MAX as f64 {
            return;
        }
        draw_hollow_circle_mut(
            &mut *self.canvas,
            (ring.center.x.round() as i32, ring.center.y.round() as i32),
            radius as i32,
            self.style.ring,
        );
    }

    fn contour(&mut self, line: &ContourLine) {
        let closing = line
            .closed
            .then(|| line.points.last().zip(line.points.first()))
            .flatten();
        let segments = line
            .points
            .windows(2)
            .map(|pair| (&pair[0], &pair[1]))
            .chain(closing);
        for (start, end) in segments {
            draw_line_segment_mut(
                &mut *self.canvas,
                (start.x as f32, start.y as f32),
                (end.x as f32, end.y as f32),
                self.style.contour,
            );
        }
    }

    fn marker(&mut self, marker: &ReaderMarker) {
        draw_filled_circle_mut(
            &mut *self.canvas,
            (marker.position.x.round() as i32, marker.position.y.round() as i32),
            MARKER_RADIUS_PX,
            self.style.marker,
        );
        if let Some(font) = self.font {
            // the anchor is the label's baseline, imageproc wants its top edge
            draw_text_mut(
                &mut *self.canvas,
                self.style.label,
                marker.label_anchor.x.round() as i32,
                (marker.label_anchor.y - LABEL_SIZE_PX as f64).round() as i32,
                PxScale::from(LABEL_SIZE_PX),
                font,
                &marker.id,
            );
        }
    }
}

/// DejaVu Sans Bold compiled into the crate, parsed once.
pub fn bundled_label_font() -> Option<&'static LabelFont> {
    static FONT: OnceLock<Option<LabelFont>> = OnceLock::new();
    FONT.get_or_init(|| match FontVec::try_from_vec(BUNDLED_FONT.to_vec()) {
        Ok(font) => Some(font),
        Err(err) => {
            warn!("bundled label font unusable, labels disabled: {err}");
            None
        }
    })
    .as_ref()
}

/// Loads a TrueType/OpenType font that overrides the bundled label font.
pub fn load_label_font(path: &Path) -> CoverageResult<LabelFont> {
    let bytes = fs::read(path)
        .map_err(|e| CoverageError::Config(format!("reading font {}: {e}", path.display())))?;
    FontVec::try_from_vec(bytes)
        .map_err(|e| CoverageError::Config(format!("parsing font {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::PixelPoint;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl OverlayPainter for Recorder {
        fn ring(&mut self, _: &BoundaryRing) {
            self.calls.push("ring");
        }
        fn contour(&mut self, _: &ContourLine) {
            self.calls.push("contour");
        }
        fn marker(&mut self, _: &ReaderMarker) {
            self.calls.push("marker");
        }
    }

    fn sample_overlays() -> OverlaySet {
        OverlaySet {
            markers: vec![ReaderMarker {
                id: "01".into(),
                position: PixelPoint::new(20.0, 20.0),
                label_anchor: PixelPoint::new(25.0, 15.0),
            }],
            rings: vec![BoundaryRing {
                id: "01".into(),
                center: PixelPoint::new(20.0, 20.0),
                radius_px: 10.0,
            }],
            contours: vec![ContourLine {
                level: 0.5,
                points: vec![
                    PixelPoint::new(2.0, 2.0),
                    PixelPoint::new(37.0, 2.0),
                    PixelPoint::new(37.0, 37.0),
                ],
                closed: true,
            }],
        }
    }

    #[test]
    fn markers_are_painted_last() {
        let mut recorder = Recorder::default();
        paint_overlays(&mut recorder, &sample_overlays());
        assert_eq!(recorder.calls, vec!["ring", "contour", "marker"]);
    }

    #[test]
    fn raster_painter_draws_every_overlay_kind() {
        let style = OverlayStyle::default();
        let mut canvas = RgbaImage::from_pixel(40, 40, Rgba([90, 90, 90, 255]));
        {
            let mut painter = RasterPainter::new(&mut canvas, None);
            paint_overlays(&mut painter, &sample_overlays());
        }
        assert_eq!(*canvas.get_pixel(20, 20), style.marker);
        assert_eq!(*canvas.get_pixel(30, 20), style.ring);
        assert_eq!(*canvas.get_pixel(10, 2), style.contour);
        // closing segment runs from (37, 37) back to (2, 2)
        assert_eq!(*canvas.get_pixel(5, 5), style.contour);
    }

    #[test]
    fn oversized_or_degenerate_rings_are_ignored() {
        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let before = canvas.clone();
        let mut painter = RasterPainter::new(&mut canvas, None);
        painter.ring(&BoundaryRing {
            id: "x".into(),
            center: PixelPoint::new(4.0, 4.0),
            radius_px: f64::INFINITY,
        });
        painter.ring(&BoundaryRing {
            id: "y".into(),
            center: PixelPoint::new(4.0, 4.0),
            radius_px: 0.2,
        });
        assert_eq!(canvas, before);
    }

    #[test]
    fn bundled_font_parses() {
        assert!(bundled_label_font().is_some());
    }

    #[test]
    fn missing_font_is_a_config_error() {
        let err = load_label_font(Path::new("/definitely/not/a/font.ttf")).unwrap_err();
        assert!(matches!(err, CoverageError::Config(_)));
    }
}
