//! Raster image stages: loading, cleanup, orientation and debug output.

pub mod debug;
pub mod load;
pub mod preprocessing;
pub mod rotation;
pub mod threshold;

pub use debug::{DebugImageSink, StageObserver};
pub use load::load_image;
pub use preprocessing::Preprocessor;
pub use rotation::{RotationCorrector, rotate_clockwise};
pub use threshold::adaptive_mean_threshold;
