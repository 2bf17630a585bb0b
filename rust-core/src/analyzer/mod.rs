//! Real-time spectral analysis pipeline

pub mod engine;
pub mod fft;
pub mod peaks;
pub mod ring;
pub mod smoothing;
pub mod snapshot;
pub mod window;

pub use engine::{ConfigError, SpectrumEngine, DEFAULT_FFT_ORDER};
pub use peaks::Peak;
pub use snapshot::{SpectrumReader, SpectrumSnapshot};
pub use window::{generate_window, WindowType};
