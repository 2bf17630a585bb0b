//! Fixed-capacity ingestion ring for streamed samples
//!
//! Holds exactly the most recent N samples and counts how many arrived
//! since the last analysis pass

/// Circular sample buffer with an analysis-trigger counter
///
/// Owned by the producer (audio) side. `push` never allocates; sizing
/// happens once at construction or reconfiguration.
pub struct SampleRing {
    data: Vec<f64>,
    cursor: usize,
    since_analysis: usize,
    hop: usize,
}

impl SampleRing {
    /// Create a ring of `len` samples, zero-filled
    ///
    /// # Arguments
    /// * `len` - Ring capacity (the transform size)
    /// * `hop` - Number of new samples between analysis triggers
    pub fn new(len: usize, hop: usize) -> Self {
        Self {
            data: vec![0.0; len],
            cursor: 0,
            since_analysis: 0,
            hop,
        }
    }

    /// Write one sample at the cursor and advance it
    ///
    /// # Returns
    /// `true` when `hop` new samples have accumulated since the last
    /// trigger; the counter resets and the caller runs an analysis pass.
    #[inline]
    pub fn push(&mut self, sample: f64) -> bool {
        self.data[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % self.data.len();
        self.since_analysis += 1;

        if self.since_analysis >= self.hop {
            self.since_analysis = 0;
            true
        } else {
            false
        }
    }

    /// Copy the ring contents into `dst` in chronological order
    ///
    /// The oldest sample sits at the write cursor; `dst` must have the
    /// same length as the ring.
    pub fn copy_ordered(&self, dst: &mut [f64]) {
        let split = self.data.len() - self.cursor;
        dst[..split].copy_from_slice(&self.data[self.cursor..]);
        dst[split..].copy_from_slice(&self.data[..self.cursor]);
    }

    /// Ring capacity in samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Samples between analysis triggers
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Zero the ring and rewind cursor and trigger counter
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.cursor = 0;
        self.since_analysis = 0;
    }
}
