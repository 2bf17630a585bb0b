//! Lock-free sample transport between capture and analysis
//!
//! Ring buffer carrying mono samples from the cpal callback to the
//! analysis worker thread

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Thread-safe sample stream buffer
pub struct StreamBuffer {
    producer: HeapProducer<f64>,
    consumer: HeapConsumer<f64>,
    capacity: usize,
}

impl StreamBuffer {
    /// Create a stream buffer with given capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<f64>::new(capacity);
        let (producer, consumer) = rb.split();

        Self {
            producer,
            consumer,
            capacity,
        }
    }

    /// Split into producer (capture callback) and consumer (analysis
    /// thread) ends
    pub fn split(self) -> (StreamProducer, StreamConsumer) {
        (
            StreamProducer {
                producer: self.producer,
            },
            StreamConsumer {
                consumer: self.consumer,
                capacity: self.capacity,
            },
        )
    }

    /// Buffer capacity in samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Writing end, owned by the capture callback
pub struct StreamProducer {
    producer: HeapProducer<f64>,
}

impl StreamProducer {
    /// Write samples, dropping the excess if the buffer is full
    ///
    /// # Returns
    /// Number of samples actually written
    pub fn write(&mut self, samples: &[f64]) -> usize {
        self.producer.push_slice(samples)
    }

    /// Free slots remaining
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }
}

/// Reading end, owned by the analysis thread
pub struct StreamConsumer {
    consumer: HeapConsumer<f64>,
    capacity: usize,
}

impl StreamConsumer {
    /// Read up to `buffer.len()` samples
    ///
    /// # Returns
    /// Number of samples actually read
    pub fn read(&mut self, buffer: &mut [f64]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Samples waiting to be read
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Buffer capacity in samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let (mut producer, mut consumer) = StreamBuffer::new(1024).split();

        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(producer.write(&data), 5);

        let mut output = vec![0.0; 5];
        assert_eq!(consumer.read(&mut output), 5);
        assert_eq!(output, data);
    }

    #[test]
    fn test_overflow_drops_excess() {
        let (mut producer, mut consumer) = StreamBuffer::new(10).split();

        let written = producer.write(&vec![1.0; 20]);
        assert!(written <= 10);

        let mut output = vec![0.0; 20];
        assert_eq!(consumer.read(&mut output), written);
    }

    #[test]
    fn test_read_from_empty() {
        let (_producer, mut consumer) = StreamBuffer::new(64).split();

        let mut output = vec![0.0; 10];
        assert_eq!(consumer.read(&mut output), 0);
        assert!(consumer.is_empty());
    }
}
