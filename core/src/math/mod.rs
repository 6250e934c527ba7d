pub mod scale;
pub mod stats;

pub use scale::ScaleFactor;
pub use stats::StatsHelper;
