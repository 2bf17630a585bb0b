//! Audio input capture using cpal
//!
//! Captures the default input device and feeds mono samples into the
//! analysis transport

use super::buffer::StreamProducer;
use crate::analyzer::ConfigError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio input device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Analyzer rejected the device configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Audio input device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Capture stream feeding mono samples to a [`StreamProducer`]
///
/// Interleaved frames are averaged down to one channel in the callback;
/// the analyzer works on a single channel.
pub struct CaptureStream {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl CaptureStream {
    /// Create a capture stream from the default input device
    ///
    /// # Arguments
    /// * `producer` - Transport producer for captured mono samples
    pub fn from_default_device(producer: StreamProducer) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, producer)
    }

    /// Create a capture stream from a specific device
    ///
    /// The device's native sample rate is accepted as-is; the caller
    /// configures the analyzer to match via [`device_info`].
    ///
    /// [`device_info`]: CaptureStream::device_info
    pub fn from_device(device: Device, producer: StreamProducer) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let device_info = AudioDeviceInfo {
            name,
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };

        let stream_config: StreamConfig = config.into();
        let channels = (device_info.channels as usize).max(1);

        // Wrap producer in Arc<Mutex> for thread-safe access
        let producer = Arc::new(Mutex::new(producer));
        let producer_clone = Arc::clone(&producer);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Average interleaved frames to mono, widening to f64
                    let mono: Vec<f64> = data
                        .chunks(channels)
                        .map(|frame| {
                            frame.iter().map(|&s| s as f64).sum::<f64>() / frame.len() as f64
                        })
                        .collect();

                    if let Ok(mut prod) = producer_clone.lock() {
                        prod.write(&mono);
                    }
                },
                move |err| {
                    eprintln!("Audio input error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
        })
    }

    /// Start capturing audio
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio capture
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

/// List available audio input devices
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .input_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_input_config() {
                devices.push(AudioDeviceInfo {
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices() {
        // Just ensure it doesn't crash
        let _ = list_input_devices();
    }
}
