pub mod log;
pub mod progress;

pub use log::{set_verbosity, verbosity};
pub use progress::ResizeProgress;
