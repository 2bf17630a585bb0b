//! Spectrum Scope - Real-Time Spectral Analysis Core
//!
//! Streaming FFT magnitude analysis with per-bin smoothing, peak-hold
//! tracking, and ranked peak detection, plus Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod analyzer;
pub mod audio;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use analyzer::{ConfigError, Peak, SpectrumEngine, SpectrumReader, SpectrumSnapshot, WindowType};
pub use audio::LiveAnalyzer;
