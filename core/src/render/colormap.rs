use image::Rgba;

type Anchors = &'static [(f64, f64)];

// Piecewise-linear channel anchors of the classic "jet" map.
const RED: Anchors = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const GREEN: Anchors = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const BLUE: Anchors = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// Maps a strength in [0, 1] to an opaque jet color. Out-of-range and NaN
/// inputs are clamped to the ends of the map.
pub fn jet(value: f64) -> Rgba<u8> {
    let v = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    };
    Rgba([to_u8(channel(RED, v)), to_u8(channel(GREEN, v)), to_u8(channel(BLUE, v)), 255])
}

fn channel(anchors: Anchors, v: f64) -> f64 {
    for pair in anchors.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if v <= x1 {
            let t = (v - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    anchors.last().map(|&(_, y)| y).unwrap_or(0.0)
}

fn to_u8(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
