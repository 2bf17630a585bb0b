//! Per-bin decibel smoothing and peak-hold tracking
//!
//! Converts linear magnitudes to dB, applies one-pole exponential smoothing
//! per bin, and keeps an independently decaying peak-hold envelope

/// Floor value for smoothed and peak-hold bins (dB)
pub const FLOOR_DB: f64 = -100.0;

/// Added to magnitudes before the logarithm so silent bins stay finite
pub const DB_EPSILON: f64 = 1e-10;

/// Per-pass multiplicative decay of held peaks
pub const PEAK_HOLD_DECAY: f64 = 0.999;

/// Upper bound of the smoothing coefficient
pub const MAX_SMOOTHING: f64 = 0.99;

/// Convert a linear magnitude to decibels with the epsilon floor
#[inline]
pub fn magnitude_to_db(magnitude: f64) -> f64 {
    20.0 * (magnitude + DB_EPSILON).log10()
}

/// Smoothed spectrum and peak-hold envelope, one value per frequency bin
pub struct SpectrumSmoother {
    smoothed: Vec<f64>,
    peak_hold: Vec<f64>,

    /// Exponential smoothing coefficient in [0, 0.99]; higher is slower
    smoothing: f64,

    peak_hold_enabled: bool,
}

impl SpectrumSmoother {
    /// Create a smoother with all bins at the floor value
    pub fn new(num_bins: usize, smoothing: f64, peak_hold_enabled: bool) -> Self {
        Self {
            smoothed: vec![FLOOR_DB; num_bins],
            peak_hold: vec![FLOOR_DB; num_bins],
            smoothing: smoothing.clamp(0.0, MAX_SMOOTHING),
            peak_hold_enabled,
        }
    }

    /// Fold one pass of linear magnitudes into the smoothed spectrum
    ///
    /// Peak-hold bins ratchet up instantly to any louder value and decay
    /// multiplicatively otherwise. Extra input bins beyond the tracked bin
    /// count are ignored.
    pub fn update(&mut self, magnitudes: &[f64]) {
        let n = self.smoothed.len().min(magnitudes.len());

        for i in 0..n {
            let db = magnitude_to_db(magnitudes[i]);

            self.smoothed[i] = self.smoothed[i] * self.smoothing + db * (1.0 - self.smoothing);

            if self.peak_hold_enabled {
                self.peak_hold[i] = (self.peak_hold[i] * PEAK_HOLD_DECAY).max(db);
            }
        }
    }

    /// Set the smoothing coefficient, clamped to [0, 0.99]
    pub fn set_smoothing(&mut self, factor: f64) {
        self.smoothing = factor.clamp(0.0, MAX_SMOOTHING);
    }

    /// Current smoothing coefficient
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Enable or disable peak-hold tracking
    ///
    /// Disabling resets the envelope to the floor; it stays there until
    /// re-enabled and refreshed by the next pass.
    pub fn set_peak_hold_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.peak_hold.fill(FLOOR_DB);
        }
        self.peak_hold_enabled = enabled;
    }

    /// Whether peak-hold tracking is active
    pub fn peak_hold_enabled(&self) -> bool {
        self.peak_hold_enabled
    }

    /// Change the tracked bin count
    ///
    /// Growth extends both arrays with floor values; shrinking truncates.
    pub fn resize(&mut self, num_bins: usize) {
        self.smoothed.resize(num_bins, FLOOR_DB);
        self.peak_hold.resize(num_bins, FLOOR_DB);
    }

    /// Reset both arrays to the floor value
    pub fn reset(&mut self) {
        self.smoothed.fill(FLOOR_DB);
        self.peak_hold.fill(FLOOR_DB);
    }

    /// Smoothed spectrum in dB, one value per bin
    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    /// Peak-hold envelope in dB, one value per bin
    pub fn peak_hold(&self) -> &[f64] {
        &self.peak_hold
    }
}
