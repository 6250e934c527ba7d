pub mod descriptor;
pub mod set;

pub use descriptor::{
    snap_radius, PixelPoint, ReaderDescriptor, DEFAULT_RADIUS_M, RADIUS_MAX_M, RADIUS_MIN_M,
    RADIUS_STEP_M,
};
pub use set::ReaderSet;
