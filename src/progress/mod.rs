//! Progress reporting for reporting sessions

mod handler;
mod logging;

pub use handler::{NoOpHandler, ProgressEvent, ProgressHandler};
pub use logging::LoggingHandler;
