pub mod contour;
pub mod geometry;
pub mod renderer;

pub use contour::{extract_contours, ContourLevels, DEFAULT_CONTOUR_LEVELS};
pub use geometry::{BoundaryRing, ContourLine, OverlaySet, ReaderMarker, LABEL_OFFSET};
pub use renderer::{render_markers_and_rings, render_overlays, render_overlays_with_levels};
