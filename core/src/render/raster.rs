use crate::field::ScalarField;
use crate::overlay::OverlaySet;
use crate::render::colormap::jet;
use crate::render::painter::{paint_overlays, RasterPainter};
use ab_glyph::FontVec;
use image::{Rgba, RgbaImage};

pub const DEFAULT_HEATMAP_ALPHA: f64 = 0.45;

/// Blends the colormapped field over the background. Pixels outside the
/// field keep the background untouched.
pub fn compose_heatmap(background: &RgbaImage, field: &ScalarField, alpha: f64) -> RgbaImage {
    let alpha = if alpha.is_finite() {
        alpha.clamp(0.0, 1.0)
    } else {
        DEFAULT_HEATMAP_ALPHA
    };
    let mut out = background.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let Some(value) = field.get(x as usize, y as usize) else {
            continue;
        };
        let Rgba(heat) = jet(value);
        let Rgba(base) = *pixel;
        let mut blended = base;
        for channel in 0..3 {
            let mixed = base[channel] as f64 * (1.0 - alpha) + heat[channel] as f64 * alpha;
            blended[channel] = mixed.round().clamp(0.0, 255.0) as u8;
        }
        *pixel = Rgba(blended);
    }
    out
}

/// Background, heatmap and overlays flattened into one image. `font`
/// overrides the bundled label font.
pub fn render_view(
    background: &RgbaImage,
    field: &ScalarField,
    overlays: &OverlaySet,
    alpha: f64,
    font: Option<&FontVec>,
) -> RgbaImage {
    let mut view = compose_heatmap(background, field, alpha);
    let mut painter = RasterPainter::new(&mut view, font);
    paint_overlays(&mut painter, overlays);
    view
}
