//! Magnitude-only forward transform using realfft
//!
//! Stateless with respect to the signal: every call fully overwrites the
//! scratch buffers, and nothing allocates after construction

use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// FFT engine for real-valued analysis frames
pub struct FftEngine {
    /// Transform size (number of samples)
    fft_size: usize,

    /// Real-to-complex FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input scratch (windowed samples, zero-padded)
    input: Vec<f64>,

    /// Reusable output scratch (complex spectrum, fft_size/2 + 1 bins)
    spectrum: Vec<num_complex::Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - Transform size (power of two)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        Self {
            fft_size,
            r2c,
            input: vec![0.0; fft_size],
            spectrum: vec![num_complex::Complex::new(0.0, 0.0); fft_size / 2 + 1],
        }
    }

    /// Compute the magnitude spectrum of `signal` into `out`
    ///
    /// The signal is copied into the internal scratch and zero-padded if
    /// shorter than the transform size. `out` receives |X[k]| for
    /// k = 0..out.len(); it may be at most `fft_size/2 + 1` long (the
    /// display surface uses `fft_size/2` and leaves the Nyquist bin out).
    pub fn magnitudes_into(&mut self, signal: &[f64], out: &mut [f64]) {
        let copy_len = signal.len().min(self.fft_size);
        self.input[..copy_len].copy_from_slice(&signal[..copy_len]);
        if copy_len < self.fft_size {
            self.input[copy_len..].fill(0.0);
        }

        self.r2c
            .process(&mut self.input, &mut self.spectrum)
            .expect("FFT processing failed");

        for (o, c) in out.iter_mut().zip(self.spectrum.iter()) {
            *o = c.norm();
        }
    }

    /// Transform size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of display bins (fft_size/2)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_dc_signal() {
        let mut fft = FftEngine::new(1024);

        // Constant signal concentrates in the DC bin
        let signal = vec![1.0; 1024];
        let mut spectrum = vec![0.0; 512];
        fft.magnitudes_into(&signal, &mut spectrum);

        assert!(spectrum[0] > 1000.0); // ~1024
        assert!(spectrum[10] < 1.0);
    }

    #[test]
    fn test_fft_sine_wave() {
        let mut fft = FftEngine::new(1024);

        // Sine at exactly bin 100
        let signal: Vec<f64> = (0..1024)
            .map(|n| (2.0 * PI * 100.0 * n as f64 / 1024.0).sin())
            .collect();
        let mut spectrum = vec![0.0; 512];
        fft.magnitudes_into(&signal, &mut spectrum);

        let (peak_bin, &peak_mag) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert_eq!(peak_bin, 100);

        // Peak magnitude is roughly N/2 for a unit sine
        assert!(peak_mag > 400.0 && peak_mag < 600.0);
    }

    #[test]
    fn test_zero_padding() {
        let mut fft = FftEngine::new(1024);

        // Shorter signal is zero-padded, longer scratch is fully overwritten
        let signal = vec![1.0; 100];
        let mut spectrum = vec![0.0; 512];
        fft.magnitudes_into(&signal, &mut spectrum);
        assert!(spectrum[0] > 90.0); // ~100

        fft.magnitudes_into(&vec![0.0; 1024], &mut spectrum);
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }
}
