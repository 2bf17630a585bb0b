//! Real-time spectral analysis engine
//!
//! Ties the pipeline together: ingestion ring, window table, forward
//! transform, smoothing, peak detection, and snapshot publication.
//! The engine is a pure computational core; the caller supplies the
//! driving cadence (audio callback, capture thread, test loop).

use super::fft::FftEngine;
use super::peaks::{Peak, PeakDetector};
use super::ring::SampleRing;
use super::smoothing::SpectrumSmoother;
use super::snapshot::{SpectrumReader, SpectrumSnapshot};
use super::window::{generate_window, WindowType};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Default transform size exponent (2^11 = 2048 samples)
pub const DEFAULT_FFT_ORDER: usize = 11;

/// Smallest accepted exponent; below this the bin count drops under the
/// peak detector's 5-bin minimum
pub const MIN_FFT_ORDER: usize = 4;

/// Largest accepted exponent (2^16 = 65536 samples)
pub const MAX_FFT_ORDER: usize = 16;

/// Default exponential smoothing coefficient
pub const DEFAULT_SMOOTHING: f64 = 0.8;

/// Rejected configuration; the engine keeps its prior valid state
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive (got {0})")]
    InvalidSampleRate(f64),

    #[error("transform size exponent {0} outside supported range 4..=16")]
    InvalidFftOrder(usize),
}

/// Parameters that survive reconfiguration and may be set before it
#[derive(Debug, Clone)]
struct AnalyzerParams {
    window_type: WindowType,
    smoothing: f64,
    peak_hold_enabled: bool,
    min_display_hz: f64,
    max_display_hz: f64,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            window_type: WindowType::default(),
            smoothing: DEFAULT_SMOOTHING,
            peak_hold_enabled: true,
            min_display_hz: super::peaks::DEFAULT_MIN_FREQUENCY_HZ,
            max_display_hz: super::peaks::DEFAULT_MAX_FREQUENCY_HZ,
        }
    }
}

/// Everything sized by (sample_rate, fft_order); rebuilt wholesale on
/// reconfiguration so no reader can catch the arrays half-resized
struct AnalysisState {
    sample_rate: f64,
    fft_order: usize,
    fft_size: usize,
    ring: SampleRing,
    window: Vec<f64>,
    windowed: Vec<f64>,
    magnitudes: Vec<f64>,
    bin_frequencies: Vec<f64>,
    fft: FftEngine,
    smoother: SpectrumSmoother,
    detector: PeakDetector,
}

impl AnalysisState {
    fn new(sample_rate: f64, fft_order: usize, params: &AnalyzerParams) -> Self {
        let fft_size = 1usize << fft_order;
        let num_bins = fft_size / 2;

        let bin_frequencies: Vec<f64> = (0..num_bins)
            .map(|i| i as f64 * sample_rate / fft_size as f64)
            .collect();

        let mut detector = PeakDetector::new();
        detector.set_display_range(params.min_display_hz, params.max_display_hz);

        Self {
            sample_rate,
            fft_order,
            fft_size,
            ring: SampleRing::new(fft_size, fft_size / 4),
            window: generate_window(params.window_type, fft_size),
            windowed: vec![0.0; fft_size],
            magnitudes: vec![0.0; num_bins],
            bin_frequencies,
            fft: FftEngine::new(fft_size),
            smoother: SpectrumSmoother::new(num_bins, params.smoothing, params.peak_hold_enabled),
            detector,
        }
    }

    /// One analysis pass over the current ring contents
    fn run_pass(&mut self, shared: &Mutex<SpectrumSnapshot>) {
        self.ring.copy_ordered(&mut self.windowed);
        for (s, w) in self.windowed.iter_mut().zip(self.window.iter()) {
            *s *= w;
        }

        self.fft.magnitudes_into(&self.windowed, &mut self.magnitudes);
        self.smoother.update(&self.magnitudes);
        self.detector
            .detect(self.smoother.smoothed(), &self.bin_frequencies);

        self.publish(shared);
    }

    /// Copy the completed pass into the shared snapshot in one critical
    /// section; readers never see values from two different passes
    fn publish(&self, shared: &Mutex<SpectrumSnapshot>) {
        let mut guard = lock_snapshot(shared);
        guard.sample_rate = self.sample_rate;
        guard.fft_size = self.fft_size;
        copy_replace(&mut guard.smoothed, self.smoother.smoothed());
        copy_replace(&mut guard.peak_hold, self.smoother.peak_hold());
        copy_replace(&mut guard.bin_frequencies, &self.bin_frequencies);
        guard.peaks.clear();
        guard.peaks.extend_from_slice(self.detector.peaks());
    }
}

fn copy_replace(dst: &mut Vec<f64>, src: &[f64]) {
    dst.clear();
    dst.extend_from_slice(src);
}

fn lock_snapshot(shared: &Mutex<SpectrumSnapshot>) -> MutexGuard<'_, SpectrumSnapshot> {
    // A poisoned lock still holds the last complete snapshot
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Streaming spectrum analyzer
///
/// Starts `Unconfigured`; `configure` sizes all per-bin state and moves it
/// to `Ready`. `ingest` before configuration is a documented safe no-op.
/// The producer role calls `ingest`; consumers poll a [`SpectrumReader`]
/// obtained from [`SpectrumEngine::reader`].
pub struct SpectrumEngine {
    params: AnalyzerParams,
    state: Option<AnalysisState>,
    shared: Arc<Mutex<SpectrumSnapshot>>,
}

impl SpectrumEngine {
    /// Create an unconfigured engine
    pub fn new() -> Self {
        Self {
            params: AnalyzerParams::default(),
            state: None,
            shared: Arc::new(Mutex::new(SpectrumSnapshot::empty())),
        }
    }

    /// Set sample rate and transform size, resizing and resetting all
    /// per-bin state
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz, must be positive
    /// * `fft_order` - Transform size exponent (2^order samples)
    ///
    /// Validation happens before any mutation: a rejected configuration
    /// leaves the prior state untouched.
    pub fn configure(&mut self, sample_rate: f64, fft_order: usize) -> Result<(), ConfigError> {
        if sample_rate <= 0.0 || !sample_rate.is_finite() {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&fft_order) {
            return Err(ConfigError::InvalidFftOrder(fft_order));
        }

        let state = AnalysisState::new(sample_rate, fft_order, &self.params);
        state.publish(&self.shared);
        self.state = Some(state);
        Ok(())
    }

    /// Whether the engine has a valid configuration
    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    /// Configured sample rate in Hz
    pub fn sample_rate(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sample_rate)
    }

    /// Configured transform size in samples
    pub fn fft_size(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.fft_size)
    }

    /// Configured transform size exponent
    pub fn fft_order(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.fft_order)
    }

    /// Number of frequency bins (fft_size / 2), 0 before configuration
    pub fn num_bins(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.fft_size / 2)
    }

    /// Feed one block of single-channel samples
    ///
    /// Every `fft_size / 4` new samples (75 % overlap) an analysis pass
    /// runs synchronously on the calling thread; a block longer than the
    /// ring triggers multiple passes within one call. Before `configure`
    /// this is a safe no-op: nothing is buffered and no analysis runs.
    pub fn ingest(&mut self, samples: &[f64]) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        for &sample in samples {
            if state.ring.push(sample) {
                state.run_pass(&self.shared);
            }
        }
    }

    /// Set the exponential smoothing coefficient, clamped to [0, 0.99]
    pub fn set_smoothing(&mut self, factor: f64) {
        self.params.smoothing = factor.clamp(0.0, super::smoothing::MAX_SMOOTHING);
        if let Some(state) = self.state.as_mut() {
            state.smoother.set_smoothing(factor);
        }
    }

    /// Current smoothing coefficient
    pub fn smoothing(&self) -> f64 {
        self.params.smoothing
    }

    /// Toggle peak-hold tracking; disabling floors the envelope
    pub fn set_peak_hold_enabled(&mut self, enabled: bool) {
        self.params.peak_hold_enabled = enabled;
        if let Some(state) = self.state.as_mut() {
            state.smoother.set_peak_hold_enabled(enabled);
            // Make the floored envelope visible without waiting for a pass
            if !enabled {
                state.publish(&self.shared);
            }
        }
    }

    /// Whether peak-hold tracking is active
    pub fn peak_hold_enabled(&self) -> bool {
        self.params.peak_hold_enabled
    }

    /// Switch the analysis window; the table is regenerated, spectra are
    /// left alone
    pub fn set_window_type(&mut self, window_type: WindowType) {
        self.params.window_type = window_type;
        if let Some(state) = self.state.as_mut() {
            state.window = generate_window(window_type, state.fft_size);
        }
    }

    /// Current analysis window type
    pub fn window_type(&self) -> WindowType {
        self.params.window_type
    }

    /// Restrict which frequencies may be reported as peaks
    pub fn set_display_range(&mut self, min_hz: f64, max_hz: f64) {
        self.params.min_display_hz = min_hz.max(0.0);
        self.params.max_display_hz = max_hz;
        if let Some(state) = self.state.as_mut() {
            state.detector.set_display_range(min_hz, max_hz);
        }
    }

    /// Floor all spectra, clear the ring and peak list, keep configuration
    pub fn reset(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.ring.reset();
            state.smoother.reset();
            state.detector.clear();
            state.publish(&self.shared);
        }
    }

    /// Smoothed spectrum in dB per bin; empty before configuration
    pub fn smoothed_spectrum(&self) -> &[f64] {
        self.state.as_ref().map_or(&[], |s| s.smoother.smoothed())
    }

    /// Peak-hold envelope in dB per bin; empty before configuration
    pub fn peak_hold(&self) -> &[f64] {
        self.state.as_ref().map_or(&[], |s| s.smoother.peak_hold())
    }

    /// Bin center frequencies in Hz; empty before configuration
    pub fn bin_frequencies(&self) -> &[f64] {
        self.state.as_ref().map_or(&[], |s| &s.bin_frequencies[..])
    }

    /// Detected peaks, descending by magnitude, at most 10
    pub fn peaks(&self) -> &[Peak] {
        self.state.as_ref().map_or(&[], |s| s.detector.peaks())
    }

    /// Read handle for the consumer side; clones freely across threads
    pub fn reader(&self) -> SpectrumReader {
        SpectrumReader::new(Arc::clone(&self.shared))
    }
}

impl Default for SpectrumEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::smoothing::FLOOR_DB;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_ingest_before_configure_is_noop() {
        let mut engine = SpectrumEngine::new();
        engine.ingest(&[0.25; 4096]);

        assert!(!engine.is_configured());
        assert!(engine.smoothed_spectrum().is_empty());
        assert!(engine.peaks().is_empty());
        assert_eq!(engine.reader().read(), SpectrumSnapshot::empty());
    }

    #[test]
    fn test_configure_validation() {
        let mut engine = SpectrumEngine::new();
        assert_eq!(
            engine.configure(0.0, 11),
            Err(ConfigError::InvalidSampleRate(0.0))
        );
        assert_eq!(
            engine.configure(44100.0, 2),
            Err(ConfigError::InvalidFftOrder(2))
        );
        assert_eq!(
            engine.configure(44100.0, 17),
            Err(ConfigError::InvalidFftOrder(17))
        );
        assert!(!engine.is_configured());

        // A rejected reconfiguration keeps the prior valid state
        engine.configure(44100.0, 11).unwrap();
        assert!(engine.configure(-1.0, 11).is_err());
        assert_eq!(engine.fft_size(), Some(2048));
        assert_eq!(engine.sample_rate(), Some(44100.0));
    }

    #[test]
    fn test_bin_frequency_mapping() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();

        let freqs = engine.bin_frequencies();
        assert_eq!(freqs.len(), 1024);
        for &i in &[0usize, 1, 46, 512, 1023] {
            assert_eq!(freqs[i], i as f64 * 44100.0 / 2048.0);
        }
    }

    #[test]
    fn test_silence_reaches_epsilon_floor() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();
        engine.set_smoothing(0.0);
        engine.ingest(&vec![0.0; 2048]);

        // 20*log10(1e-10) = -200 dB in every bin, and nothing to detect
        for &s in engine.smoothed_spectrum() {
            assert!((s + 200.0).abs() < 1e-9);
        }
        assert!(engine.peaks().is_empty());
    }

    #[test]
    fn test_silence_with_default_smoothing() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();
        engine.ingest(&vec![0.0; 2048]);

        for &s in engine.smoothed_spectrum() {
            assert!(s <= FLOOR_DB);
        }
        assert!(engine.peaks().is_empty());
    }

    #[test]
    fn test_sine_peak_tracks_input_frequency() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();

        // One oversized block: overlap analysis fires 80 times within a
        // single ingest call
        engine.ingest(&sine(1000.0, 44100.0, 2048 * 20));

        let bin_width = 44100.0 / 2048.0;
        let smoothed = engine.smoothed_spectrum();
        let freqs = engine.bin_frequencies();

        let (max_bin, _) = smoothed
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();
        assert!((freqs[max_bin] - 1000.0).abs() <= bin_width);

        let peaks = engine.peaks();
        assert!(!peaks.is_empty());
        assert!(peaks.len() <= 10);
        assert!((peaks[0].frequency - 1000.0).abs() <= bin_width);
        assert!(peaks[0].magnitude_db > 0.0);

        // Separation invariant over the whole list
        for a in 0..peaks.len() {
            for b in a + 1..peaks.len() {
                assert!((peaks[a].frequency - peaks[b].frequency).abs() >= 100.0);
            }
        }
    }

    #[test]
    fn test_reconfigure_resizes_and_floors() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();
        engine.ingest(&sine(1000.0, 44100.0, 4096));
        assert!(engine.smoothed_spectrum().iter().any(|&s| s > FLOOR_DB));

        engine.configure(44100.0, 10).unwrap();
        assert_eq!(engine.num_bins(), 512);
        assert!(engine.smoothed_spectrum().iter().all(|&s| s == FLOOR_DB));
        assert!(engine.peak_hold().iter().all(|&p| p == FLOOR_DB));
        assert!(engine.peaks().is_empty());
        assert_eq!(engine.bin_frequencies()[1], 44100.0 / 1024.0);

        // The published snapshot follows immediately
        let snap = engine.reader().read();
        assert_eq!(snap.fft_size, 1024);
        assert_eq!(snap.num_bins(), 512);
        assert!(snap.smoothed.iter().all(|&s| s == FLOOR_DB));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();
        engine.ingest(&sine(440.0, 44100.0, 8192));

        engine.reset();
        let once = engine.reader().read();
        assert!(once.smoothed.iter().all(|&s| s == FLOOR_DB));
        assert!(once.peaks.is_empty());

        engine.reset();
        assert_eq!(engine.reader().read(), once);
    }

    #[test]
    fn test_peak_hold_disable_floors_published_envelope() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();
        engine.ingest(&sine(1000.0, 44100.0, 8192));
        assert!(engine.peak_hold().iter().any(|&p| p > FLOOR_DB));

        engine.set_peak_hold_enabled(false);
        assert!(engine.peak_hold().iter().all(|&p| p == FLOOR_DB));
        assert!(engine.reader().read().peak_hold.iter().all(|&p| p == FLOOR_DB));
    }

    #[test]
    fn test_smoothing_set_before_configure_is_kept() {
        let mut engine = SpectrumEngine::new();
        engine.set_smoothing(0.0);
        engine.configure(44100.0, 11).unwrap();
        engine.ingest(&vec![0.0; 2048]);

        for &s in engine.smoothed_spectrum() {
            assert!((s + 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_display_range_excludes_peaks() {
        let mut engine = SpectrumEngine::new();
        engine.configure(44100.0, 11).unwrap();
        engine.set_display_range(20.0, 2000.0);
        engine.ingest(&sine(5000.0, 44100.0, 2048 * 20));

        assert!(engine.peaks().iter().all(|p| p.frequency <= 2000.0));
    }

    #[test]
    fn test_rectangular_window_on_bin_center() {
        let mut engine = SpectrumEngine::new();
        engine.configure(48000.0, 11).unwrap();
        engine.set_window_type(WindowType::Rectangular);
        engine.set_smoothing(0.0);

        // Bin 100 exactly: 100 * 48000 / 2048 Hz
        engine.ingest(&sine(100.0 * 48000.0 / 2048.0, 48000.0, 2048));

        // Unwindowed on-center sine: |X| = N/2 = 1024, ~60.2 dB
        let smoothed = engine.smoothed_spectrum();
        assert!(smoothed[100] > 59.0 && smoothed[100] < 61.0);
    }

    #[test]
    fn test_concurrent_reader_sees_complete_snapshots() {
        let mut engine = SpectrumEngine::new();
        engine.configure(48000.0, 10).unwrap();
        let reader = engine.reader();

        let consumer = std::thread::spawn(move || {
            for _ in 0..200 {
                let snap = reader.read();
                assert_eq!(snap.smoothed.len(), snap.bin_frequencies.len());
                assert_eq!(snap.peak_hold.len(), snap.smoothed.len());
                assert!(snap.peaks.len() <= 10);
            }
        });

        let block = sine(440.0, 48000.0, 256);
        for _ in 0..200 {
            engine.ingest(&block);
        }
        consumer.join().unwrap();
    }
}
