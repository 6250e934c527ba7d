pub mod compositor;

pub use compositor::{compose, falloff_sigma, ScalarField, FALLOFF_SHAPE};
