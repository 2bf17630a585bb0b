//! Live capture driver for the spectrum engine
//!
//! Keeps the hot loop in Rust: the capture callback fills the transport,
//! a worker thread drains it into the engine, and display code polls
//! snapshots at its own cadence

use super::buffer::StreamBuffer;
use super::input::{list_input_devices, AudioError, CaptureStream};
use crate::analyzer::{SpectrumEngine, SpectrumReader, WindowType, DEFAULT_FFT_ORDER};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Transport capacity in samples (about 2 s at 48 kHz)
const TRANSPORT_CAPACITY: usize = 96_000;

/// Worker read chunk in samples
const CHUNK_SIZE: usize = 2048;

fn lock_engine(engine: &Mutex<SpectrumEngine>) -> MutexGuard<'_, SpectrumEngine> {
    match engine.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Capture-driven spectrum analyzer
///
/// Owns a [`SpectrumEngine`] plus the capture stream and worker thread
/// that feed it. The engine is configured from the device's native sample
/// rate when the stream starts.
pub struct LiveAnalyzer {
    engine: Arc<Mutex<SpectrumEngine>>,
    fft_order: usize,
    input: Option<CaptureStream>,
    worker: Option<std::thread::JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl LiveAnalyzer {
    /// Create a stopped analyzer
    ///
    /// # Arguments
    /// * `fft_order` - Transform size exponent; validated when `start`
    ///   configures the engine
    pub fn new(fft_order: usize) -> Self {
        Self {
            engine: Arc::new(Mutex::new(SpectrumEngine::new())),
            fft_order,
            input: None,
            worker: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a stopped analyzer with the default transform size
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FFT_ORDER)
    }

    /// Start capture and analysis
    ///
    /// Restarts cleanly if already running.
    ///
    /// # Returns
    /// The capture device name
    pub fn start(&mut self) -> Result<String, AudioError> {
        self.stop();

        let (producer, consumer) = StreamBuffer::new(TRANSPORT_CAPACITY).split();
        let input = CaptureStream::from_default_device(producer)?;
        let device_name = input.device_info().name.clone();
        let sample_rate = input.device_info().sample_rate as f64;

        lock_engine(&self.engine).configure(sample_rate, self.fft_order)?;

        input.start()?;
        self.input = Some(input);

        self.running.store(true, Ordering::SeqCst);
        let engine = Arc::clone(&self.engine);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            let mut consumer = consumer;
            let mut chunk = vec![0.0; CHUNK_SIZE];

            while running.load(Ordering::SeqCst) {
                let n = consumer.read(&mut chunk);
                if n > 0 {
                    lock_engine(&engine).ingest(&chunk[..n]);
                } else {
                    // Let the callback refill the transport without
                    // burning a core
                    std::thread::sleep(std::time::Duration::from_micros(100));
                }
            }
        });
        self.worker = Some(handle);

        Ok(device_name)
    }

    /// Stop capture and join the worker thread
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        if let Some(input) = &self.input {
            let _ = input.pause();
        }
        self.input = None;
    }

    /// Whether capture is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Read handle for display code; valid before and after `start`
    pub fn reader(&self) -> SpectrumReader {
        lock_engine(&self.engine).reader()
    }

    /// Set the exponential smoothing coefficient, clamped to [0, 0.99]
    pub fn set_smoothing(&self, factor: f64) {
        lock_engine(&self.engine).set_smoothing(factor);
    }

    /// Toggle peak-hold tracking
    pub fn set_peak_hold_enabled(&self, enabled: bool) {
        lock_engine(&self.engine).set_peak_hold_enabled(enabled);
    }

    /// Switch the analysis window
    pub fn set_window_type(&self, window_type: WindowType) {
        lock_engine(&self.engine).set_window_type(window_type);
    }

    /// Restrict which frequencies may be reported as peaks
    pub fn set_display_range(&self, min_hz: f64, max_hz: f64) {
        lock_engine(&self.engine).set_display_range(min_hz, max_hz);
    }

    /// Floor all spectra without changing configuration
    pub fn reset(&self) {
        lock_engine(&self.engine).reset();
    }

    /// List available capture device names
    pub fn list_devices() -> Result<Vec<String>, AudioError> {
        list_input_devices().map(|devices| devices.into_iter().map(|d| d.name).collect())
    }
}

impl Drop for LiveAnalyzer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_analyzer_state() {
        let analyzer = LiveAnalyzer::with_defaults();
        assert!(!analyzer.is_running());

        // Reader exists before start and sees the unconfigured snapshot
        let snap = analyzer.reader().read();
        assert_eq!(snap.num_bins(), 0);
    }

    #[test]
    fn test_stop_without_start() {
        let mut analyzer = LiveAnalyzer::new(11);
        analyzer.stop();
        analyzer.stop();
        assert!(!analyzer.is_running());
    }
}
