//! Spectral peak detection
//!
//! Scans the smoothed spectrum for constrained local maxima and keeps a
//! ranked, bounded list rebuilt from scratch every analysis pass

use std::cmp::Ordering;

/// Maximum number of reported peaks
pub const MAX_PEAKS: usize = 10;

/// Default minimum magnitude for a peak candidate (dB)
pub const DEFAULT_MIN_PEAK_DB: f64 = -40.0;

/// Default minimum spacing between accepted peaks (Hz)
pub const DEFAULT_MIN_SEPARATION_HZ: f64 = 100.0;

/// Default display range bounds (Hz)
pub const DEFAULT_MIN_FREQUENCY_HZ: f64 = 20.0;
pub const DEFAULT_MAX_FREQUENCY_HZ: f64 = 20_000.0;

/// One detected spectral peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Center frequency of the peak bin in Hz
    pub frequency: f64,

    /// Smoothed magnitude at the peak bin in dB
    pub magnitude_db: f64,
}

/// Local-maxima peak detector with magnitude and separation constraints
pub struct PeakDetector {
    min_magnitude_db: f64,
    min_separation_hz: f64,
    min_frequency_hz: f64,
    max_frequency_hz: f64,
    peaks: Vec<Peak>,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self {
            min_magnitude_db: DEFAULT_MIN_PEAK_DB,
            min_separation_hz: DEFAULT_MIN_SEPARATION_HZ,
            min_frequency_hz: DEFAULT_MIN_FREQUENCY_HZ,
            max_frequency_hz: DEFAULT_MAX_FREQUENCY_HZ,
            peaks: Vec::with_capacity(MAX_PEAKS),
        }
    }
}

impl PeakDetector {
    /// Create a detector with default constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the peak list from a smoothed spectrum
    ///
    /// A bin is a candidate iff it strictly exceeds its four nearest
    /// neighbors (i±1, i±2), clears the magnitude threshold, and maps into
    /// the display range. Candidates are walked in scan order and dropped
    /// when an already-accepted peak lies within the minimum separation,
    /// then ranked descending by magnitude and truncated. Equal magnitudes
    /// keep scan order (stable sort), so the lower-frequency peak wins.
    ///
    /// Fewer than 5 bins yields an empty list.
    pub fn detect(&mut self, smoothed: &[f64], bin_frequencies: &[f64]) {
        self.peaks.clear();

        if smoothed.len() < 5 || bin_frequencies.len() < smoothed.len() {
            return;
        }

        for i in 2..smoothed.len() - 2 {
            let m = smoothed[i];
            let frequency = bin_frequencies[i];

            let is_local_max = m > smoothed[i - 1]
                && m > smoothed[i + 1]
                && m > smoothed[i - 2]
                && m > smoothed[i + 2];

            if !is_local_max
                || m <= self.min_magnitude_db
                || frequency < self.min_frequency_hz
                || frequency > self.max_frequency_hz
            {
                continue;
            }

            let too_close = self
                .peaks
                .iter()
                .any(|p| (frequency - p.frequency).abs() < self.min_separation_hz);

            if !too_close {
                self.peaks.push(Peak {
                    frequency,
                    magnitude_db: m,
                });
            }
        }

        self.peaks.sort_by(|a, b| {
            b.magnitude_db
                .partial_cmp(&a.magnitude_db)
                .unwrap_or(Ordering::Equal)
        });
        self.peaks.truncate(MAX_PEAKS);
    }

    /// Current peak list, descending by magnitude
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Restrict which frequencies may become peaks
    pub fn set_display_range(&mut self, min_hz: f64, max_hz: f64) {
        self.min_frequency_hz = min_hz.max(0.0);
        self.max_frequency_hz = max_hz;
    }

    /// Set the candidate magnitude threshold in dB
    pub fn set_min_magnitude(&mut self, db: f64) {
        self.min_magnitude_db = db;
    }

    /// Set the minimum spacing between accepted peaks in Hz
    pub fn set_min_separation(&mut self, hz: f64) {
        self.min_separation_hz = hz;
    }

    /// Drop all peaks
    pub fn clear(&mut self) {
        self.peaks.clear();
    }
}
