//! Signal-field core for the RFID coverage designer.
//!
//! Reader descriptors flow through the field compositor into a normalized
//! scalar field, and the overlay renderer derives markers, boundary rings and
//! iso-strength contours from it. Rendering, export and the interactive
//! session sit on top of those two pure stages.

pub mod config;
pub mod field;
pub mod floorplan;
pub mod math;
pub mod overlay;
pub mod prelude;
pub mod reader;
pub mod render;
pub mod session;
pub mod telemetry;

pub use field::compose;
pub use overlay::{render_overlays, render_overlays_with_levels};
pub use prelude::{CoverageError, CoverageResult, GridSize};
