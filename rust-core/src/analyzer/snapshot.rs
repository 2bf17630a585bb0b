//! Published analysis results
//!
//! The producer publishes a complete snapshot after every analysis pass;
//! consumers read whole snapshots and can never observe a half-updated pass

use super::peaks::Peak;
use std::sync::{Arc, Mutex, MutexGuard};

/// One complete, self-consistent analysis result set
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSnapshot {
    /// Sample rate the pass was computed at (Hz)
    pub sample_rate: f64,

    /// Transform size of the pass
    pub fft_size: usize,

    /// Smoothed spectrum in dB, one value per bin
    pub smoothed: Vec<f64>,

    /// Peak-hold envelope in dB, one value per bin
    pub peak_hold: Vec<f64>,

    /// Bin center frequencies in Hz, aligned by index with the spectrum
    pub bin_frequencies: Vec<f64>,

    /// Detected peaks, descending by magnitude, at most 10
    pub peaks: Vec<Peak>,
}

impl SpectrumSnapshot {
    /// Snapshot of an unconfigured engine: no bins, no peaks
    pub fn empty() -> Self {
        Self {
            sample_rate: 0.0,
            fft_size: 0,
            smoothed: Vec::new(),
            peak_hold: Vec::new(),
            bin_frequencies: Vec::new(),
            peaks: Vec::new(),
        }
    }

    /// Number of frequency bins
    pub fn num_bins(&self) -> usize {
        self.smoothed.len()
    }
}

/// Cloneable read handle for the consumer side
///
/// Reads lock only the published snapshot, never the analysis state, so a
/// display thread polling at its own cadence contends with the producer
/// only for the duration of one buffer copy.
#[derive(Clone)]
pub struct SpectrumReader {
    shared: Arc<Mutex<SpectrumSnapshot>>,
}

impl SpectrumReader {
    pub(crate) fn new(shared: Arc<Mutex<SpectrumSnapshot>>) -> Self {
        Self { shared }
    }

    fn lock(&self) -> MutexGuard<'_, SpectrumSnapshot> {
        // A poisoned lock still holds the last published snapshot
        match self.shared.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Clone the latest published snapshot
    pub fn read(&self) -> SpectrumSnapshot {
        self.lock().clone()
    }

    /// Copy the latest snapshot into `out`, reusing its allocations
    pub fn read_into(&self, out: &mut SpectrumSnapshot) {
        out.clone_from(&self.lock());
    }
}
