use crate::reader::PixelPoint;
use serde::{Deserialize, Serialize};

/// Label anchor offset from a marker, in pixels (right and up).
pub const LABEL_OFFSET: (f64, f64) = (5.0, -5.0);

/// A reader's position dot and its id label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderMarker {
    pub id: String,
    pub position: PixelPoint,
    pub label_anchor: PixelPoint,
}

/// Circle at a reader's configured nominal radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRing {
    pub id: String,
    pub center: PixelPoint,
    pub radius_px: f64,
}

/// Iso-strength polyline. Closed lines do not repeat their first point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourLine {
    pub level: f64,
    pub points: Vec<PixelPoint>,
    pub closed: bool,
}

/// Everything a display collaborator draws on top of the heatmap.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlaySet {
    pub markers: Vec<ReaderMarker>,
    pub rings: Vec<BoundaryRing>,
    pub contours: Vec<ContourLine>,
}
