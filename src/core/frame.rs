use super::types::Sample;
use crate::error::{VgmError, VgmResult};
use std::time::Duration;

/// A run of rendered, interleaved 16-bit samples
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Interleaved samples
    samples: Vec<Sample>,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Number of channels
    channels: usize,
    /// Absolute index of the first sample in the rendered output
    first_sample: u64,
}

impl AudioFrame {
    /// Create a new frame
    pub fn new(
        samples: Vec<Sample>,
        sample_rate: u32,
        channels: usize,
        first_sample: u64,
    ) -> VgmResult<Self> {
        if sample_rate == 0 {
            return Err(VgmError::InvalidSampleRate { rate: sample_rate });
        }
        if channels == 0 {
            return Err(VgmError::InvalidChannels {
                expected: 1,
                got: 0,
            });
        }
        if samples.len() % channels != 0 {
            return Err(VgmError::BufferError(
                "Sample count not divisible by channel count".to_string(),
            ));
        }

        Ok(AudioFrame {
            samples,
            sample_rate,
            channels,
            first_sample,
        })
    }

    /// Get reference to the samples
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Get mutable reference to the samples
    pub fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Get owned samples (consumes frame)
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Get sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get channel count
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Get number of samples per channel
    pub fn samples_per_channel(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Absolute index of the first sample
    pub fn first_sample(&self) -> u64 {
        self.first_sample
    }

    /// Get timestamp of this frame
    pub fn timestamp(&self) -> Duration {
        Duration::from_secs_f64(self.first_sample as f64 / self.sample_rate as f64)
    }

    /// Check if frame is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_frame_creation() {
        let frame = AudioFrame::new(vec![1, 2, 3, 4], 44100, 2, 44100).unwrap();

        assert_eq!(frame.sample_rate(), 44100);
        assert_eq!(frame.channels(), 2);
        assert_eq!(frame.samples_per_channel(), 2);
        assert_eq!(frame.timestamp(), Duration::from_secs(1));
    }

    #[test]
    fn test_audio_frame_invalid_samples() {
        assert!(AudioFrame::new(vec![1, 2, 3], 44100, 2, 0).is_err());
        assert!(AudioFrame::new(vec![1, 2], 0, 2, 0).is_err());
        assert!(AudioFrame::new(vec![1, 2], 44100, 0, 0).is_err());
    }
}
