//! Python bindings for the live capture driver

use super::engine_bindings::PyWindowType;
use crate::audio::LiveAnalyzer;
use numpy::PyArray1;
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

/// Live capture analyzer exposed to Python
///
/// Capture and analysis stay in Rust threads; Python only polls snapshots.
#[pyclass(name = "LiveAnalyzer", unsendable)]
pub struct PyLiveAnalyzer {
    analyzer: LiveAnalyzer,
}

#[pymethods]
impl PyLiveAnalyzer {
    /// Create a stopped analyzer
    ///
    /// Args:
    ///     fft_order: Transform size exponent (2^order samples)
    #[new]
    #[pyo3(signature = (fft_order=11))]
    fn new(fft_order: usize) -> Self {
        Self {
            analyzer: LiveAnalyzer::new(fft_order),
        }
    }

    /// Start capture and analysis
    ///
    /// Returns:
    ///     Capture device name
    fn start(&mut self) -> PyResult<String> {
        self.analyzer
            .start()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Stop capture
    fn stop(&mut self) {
        self.analyzer.stop();
    }

    /// Whether capture is running
    fn is_running(&self) -> bool {
        self.analyzer.is_running()
    }

    /// Set exponential smoothing coefficient (clamped to [0, 0.99])
    fn set_smoothing(&self, factor: f64) {
        self.analyzer.set_smoothing(factor);
    }

    /// Toggle peak-hold tracking
    fn set_peak_hold(&self, enabled: bool) {
        self.analyzer.set_peak_hold_enabled(enabled);
    }

    /// Switch the analysis window
    fn set_window_type(&self, window_type: PyWindowType) {
        self.analyzer.set_window_type(window_type.into());
    }

    /// Restrict which frequencies may be reported as peaks
    fn set_display_range(&self, min_hz: f64, max_hz: f64) {
        self.analyzer.set_display_range(min_hz, max_hz);
    }

    /// Floor all spectra without changing configuration
    fn reset(&self) {
        self.analyzer.reset();
    }

    /// Read the latest published snapshot
    ///
    /// Returns:
    ///     Dictionary with keys 'smoothed', 'peak_hold', 'bin_frequencies'
    ///     (numpy arrays), 'peaks' (list of (frequency_hz, magnitude_db)
    ///     tuples), 'sample_rate', and 'fft_size'
    fn read(&self, py: Python<'_>) -> PyResult<PyObject> {
        let snap = self.analyzer.reader().read();
        let peaks: Vec<(f64, f64)> = snap
            .peaks
            .iter()
            .map(|p| (p.frequency, p.magnitude_db))
            .collect();

        let dict = pyo3::types::PyDict::new(py);
        dict.set_item("smoothed", PyArray1::from_slice(py, &snap.smoothed))?;
        dict.set_item("peak_hold", PyArray1::from_slice(py, &snap.peak_hold))?;
        dict.set_item(
            "bin_frequencies",
            PyArray1::from_slice(py, &snap.bin_frequencies),
        )?;
        dict.set_item("peaks", peaks)?;
        dict.set_item("sample_rate", snap.sample_rate)?;
        dict.set_item("fft_size", snap.fft_size)?;

        Ok(dict.into())
    }

    /// List available capture device names
    #[staticmethod]
    fn list_devices() -> PyResult<Vec<String>> {
        LiveAnalyzer::list_devices().map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}
