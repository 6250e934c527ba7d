pub mod colormap;
pub mod export;
pub mod legend;
pub mod painter;
pub mod raster;

pub use colormap::jet;
pub use export::{export_png, EXPORT_DPI, EXPORT_FILE_NAME};
pub use legend::{legend_colors, legend_strip, LEGEND_CAPTION, LEGEND_STOPS};
pub use painter::{
    bundled_label_font, load_label_font, paint_overlays, LabelFont, OverlayPainter, OverlayStyle,
    RasterPainter,
};
pub use raster::{compose_heatmap, render_view, DEFAULT_HEATMAP_ALPHA};
