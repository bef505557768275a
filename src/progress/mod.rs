//! Concurrent multi-task progress display.

pub mod clock;
pub mod estimate;
pub mod geometry;
pub mod layout;
pub mod multi;
pub mod spinner;
pub mod status;
pub mod writer;

pub use estimate::EstimateConfig;
pub use geometry::{Geometry, WidthSource};
pub use multi::{MultiProgress, MultiProgressOptions, DEFAULT_RENDER_INTERVAL, MIN_RENDER_INTERVAL};
pub use spinner::{ProgressSpinner, TaskSnapshot, INCREMENT_BYTES};
pub use status::TaskStatus;
pub use writer::SpinnerWriter;
