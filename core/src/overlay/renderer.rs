use crate::field::ScalarField;
use crate::overlay::contour::{extract_contours, ContourLevels};
use crate::overlay::geometry::{BoundaryRing, OverlaySet, ReaderMarker, LABEL_OFFSET};
use crate::reader::ReaderDescriptor;

/// Derives overlays using the default contour levels.
pub fn render_overlays(
    field: &ScalarField,
    readers: &[ReaderDescriptor],
    pixels_per_meter: f64,
) -> OverlaySet {
    render_overlays_with_levels(field, readers, pixels_per_meter, &ContourLevels::default())
}

pub fn render_overlays_with_levels(
    field: &ScalarField,
    readers: &[ReaderDescriptor],
    pixels_per_meter: f64,
    levels: &ContourLevels,
) -> OverlaySet {
    let mut overlays = render_markers_and_rings(readers, pixels_per_meter);
    overlays.contours = extract_contours(field, levels);
    overlays
}

/// Overlays without iso-lines, used when contour extraction is skipped.
pub fn render_markers_and_rings(
    readers: &[ReaderDescriptor],
    pixels_per_meter: f64,
) -> OverlaySet {
    OverlaySet {
        markers: readers.iter().map(marker_for).collect(),
        rings: readers
            .iter()
            .map(|reader| ring_for(reader, pixels_per_meter))
            .collect(),
        contours: Vec::new(),
    }
}

fn marker_for(reader: &ReaderDescriptor) -> ReaderMarker {
    ReaderMarker {
        id: reader.id.clone(),
        position: reader.position,
        label_anchor: reader.position.offset(LABEL_OFFSET.0, LABEL_OFFSET.1),
    }
}

fn ring_for(reader: &ReaderDescriptor, pixels_per_meter: f64) -> BoundaryRing {
    BoundaryRing {
        id: reader.id.clone(),
        center: reader.position,
        radius_px: reader.radius_px(pixels_per_meter),
    }
}
