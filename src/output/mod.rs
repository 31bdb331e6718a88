//! Frame sinks: where generated frames go besides the window.

mod png;
mod raw;

use crate::error::SinkError;
use crate::generator::Frame;

// Re-export public types
pub use png::PngSequenceSink;
pub use raw::{RawFrameSink, RAW_MAGIC};

/// Receives every frame the driver publishes, in order
pub trait FrameSink {
    fn publish(&mut self, frame: &Frame) -> Result<(), SinkError>;

    /// Called once when the driver shuts down
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
