use crate::core::{AudioFrame, Sample};
use crate::error::{VgmError, VgmResult};

/// Linear fade-out over a fixed window of the rendered output
#[derive(Clone, Debug)]
pub struct Fade {
    /// First sample of the fade
    start: u64,
    /// Samples from full volume to silence
    length: u64,
}

impl Fade {
    /// Fade out over `length` samples starting at sample `start`
    pub fn new(start: u64, length: u64) -> Self {
        Fade { start, length }
    }

    /// Fade that ends at `total` samples and lasts `seconds`
    pub fn ending_at(total: u64, seconds: f64, sample_rate: u32) -> VgmResult<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(VgmError::ConfigError(format!(
                "Fade length must be a non-negative number, got {}",
                seconds
            )));
        }
        let length = ((seconds * sample_rate as f64) as u64).min(total);
        Ok(Fade::new(total - length, length))
    }

    /// Volume at absolute sample `position`, from 1.0 down to 0.0
    fn gain(&self, position: u64) -> f64 {
        if position < self.start {
            1.0
        } else if position >= self.start + self.length {
            0.0
        } else {
            (self.length - (position - self.start)) as f64 / self.length as f64
        }
    }
}

impl super::Filter for Fade {
    fn process(&mut self, frame: &AudioFrame) -> VgmResult<AudioFrame> {
        let first = frame.first_sample();
        if first + (frame.samples_per_channel() as u64) <= self.start {
            return Ok(frame.clone());
        }

        let channels = frame.channels();
        let faded: Vec<Sample> = frame
            .samples()
            .chunks(channels)
            .enumerate()
            .flat_map(|(i, samples)| {
                let gain = self.gain(first + i as u64);
                samples.iter().map(move |&s| (s as f64 * gain) as Sample)
            })
            .collect();

        AudioFrame::new(faded, frame.sample_rate(), channels, first)
    }
}
