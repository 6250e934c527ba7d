use crate::render::colormap::jet;
use image::{Rgba, RgbaImage};

pub const LEGEND_CAPTION: &str = "Blue = Weak, Green = Good, Red = Strong";
pub const LEGEND_STOPS: usize = 256;

/// Evenly spaced colormap samples from weak (0) to strong (1).
pub fn legend_colors(stops: usize) -> Vec<Rgba<u8>> {
    match stops {
        0 => Vec::new(),
        1 => vec![jet(0.0)],
        _ => (0..stops)
            .map(|i| jet(i as f64 / (stops - 1) as f64))
            .collect(),
    }
}

/// Horizontal gradient strip, weak on the left.
pub fn legend_strip(width: u32, height: u32) -> RgbaImage {
    let colors = legend_colors(width as usize);
    RgbaImage::from_fn(width, height, |x, _| colors[x as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_span_full_map() {
        let colors = legend_colors(LEGEND_STOPS);
        assert_eq!(colors.len(), 256);
        assert_eq!(colors[0], jet(0.0));
        assert_eq!(colors[255], jet(1.0));
        assert!(legend_colors(0).is_empty());
    }

    #[test]
    fn strip_is_constant_down_each_column() {
        let strip = legend_strip(64, 6);
        assert_eq!(strip.dimensions(), (64, 6));
        assert_eq!(strip.get_pixel(10, 0), strip.get_pixel(10, 5));
        assert_eq!(*strip.get_pixel(63, 3), jet(1.0));
    }
}
