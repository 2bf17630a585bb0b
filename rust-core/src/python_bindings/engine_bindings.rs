//! Python bindings for the spectrum engine

use crate::analyzer::{SpectrumEngine, WindowType};
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone)]
pub enum PyWindowType {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

/// Spectrum engine exposed to Python
#[pyclass(name = "SpectrumEngine")]
pub struct PySpectrumEngine {
    engine: SpectrumEngine,
}

#[pymethods]
impl PySpectrumEngine {
    /// Create an unconfigured engine
    #[new]
    fn new() -> Self {
        Self {
            engine: SpectrumEngine::new(),
        }
    }

    /// Set sample rate and transform size
    ///
    /// Args:
    ///     sample_rate: Sample rate in Hz
    ///     fft_order: Transform size exponent (2^order samples)
    ///
    /// Raises:
    ///     ValueError: Rejected configuration; prior state is kept
    #[pyo3(signature = (sample_rate, fft_order=11))]
    fn configure(&mut self, sample_rate: f64, fft_order: usize) -> PyResult<()> {
        self.engine
            .configure(sample_rate, fft_order)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Feed one block of single-channel samples
    ///
    /// Args:
    ///     samples: Mono samples as numpy array
    fn ingest(&mut self, samples: PyReadonlyArray1<f64>) -> PyResult<()> {
        self.engine.ingest(samples.as_slice()?);
        Ok(())
    }

    /// Set exponential smoothing coefficient (clamped to [0, 0.99])
    fn set_smoothing(&mut self, factor: f64) {
        self.engine.set_smoothing(factor);
    }

    /// Toggle peak-hold tracking; disabling floors the envelope
    fn set_peak_hold(&mut self, enabled: bool) {
        self.engine.set_peak_hold_enabled(enabled);
    }

    /// Switch the analysis window
    fn set_window_type(&mut self, window_type: PyWindowType) {
        self.engine.set_window_type(window_type.into());
    }

    /// Restrict which frequencies may be reported as peaks
    fn set_display_range(&mut self, min_hz: f64, max_hz: f64) {
        self.engine.set_display_range(min_hz, max_hz);
    }

    /// Floor all spectra without changing configuration
    fn reset(&mut self) {
        self.engine.reset();
    }

    /// Smoothed spectrum in dB per bin
    fn smoothed_spectrum<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.engine.smoothed_spectrum())
    }

    /// Peak-hold envelope in dB per bin
    fn peak_hold<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.engine.peak_hold())
    }

    /// Bin center frequencies in Hz
    fn bin_frequencies<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.engine.bin_frequencies())
    }

    /// Detected peaks as (frequency_hz, magnitude_db) tuples
    fn peaks(&self) -> Vec<(f64, f64)> {
        self.engine
            .peaks()
            .iter()
            .map(|p| (p.frequency, p.magnitude_db))
            .collect()
    }

    /// Number of frequency bins
    fn num_bins(&self) -> usize {
        self.engine.num_bins()
    }

    /// Whether the engine has a valid configuration
    fn is_configured(&self) -> bool {
        self.engine.is_configured()
    }
}
