use crate::prelude::{CoverageError, CoverageResult};
use image::RgbaImage;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

pub const EXPORT_FILE_NAME: &str = "custom_rfid_coverage.png";
pub const EXPORT_DPI: u32 = 300;

const METERS_PER_INCH: f64 = 0.0254;

pub fn dpi_to_pixels_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / METERS_PER_INCH).round() as u32
}

/// Writes an RGBA PNG tagged with the export DPI, replacing any existing file.
pub fn export_png(image: &RgbaImage, path: &Path) -> CoverageResult<()> {
    let fail = |reason: String| CoverageError::Export {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| fail(format!("creating {}: {e}", parent.display())))?;
        }
    }

    let file = File::create(path).map_err(|e| fail(e.to_string()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let ppm = dpi_to_pixels_per_meter(EXPORT_DPI);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header().map_err(|e| fail(e.to_string()))?;
    writer
        .write_image_data(image.as_raw())
        .map_err(|e| fail(e.to_string()))?;
    writer.finish().map_err(|e| fail(e.to_string()))
}
