//! Audio capture and the live analysis driver

pub mod buffer;
pub mod input;
pub mod live;

pub use buffer::StreamBuffer;
pub use input::{AudioError, CaptureStream};
pub use live::LiveAnalyzer;
