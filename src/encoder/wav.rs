use crate::core::AudioFrame;
use crate::error::{VgmError, VgmResult};
use hound::{WavSpec, WavWriter};
use std::path::Path;

/// Writes rendered session output as a 16-bit integer WAV file.
///
/// Frames must match the rate and channel count the file was created with;
/// samples go out in the interleaved order `render` produced them.
pub struct WavEncoder {
    writer: Option<WavWriter<std::io::BufWriter<std::fs::File>>>,
    sample_rate: u32,
    channels: usize,
}

impl WavEncoder {
    /// Create `path` for a session rendering `channels` channels at `sample_rate`
    pub fn new<P: AsRef<Path>>(path: P, sample_rate: u32, channels: usize) -> VgmResult<Self> {
        let channel_count = u16::try_from(channels)
            .ok()
            .filter(|&c| c > 0)
            .ok_or(VgmError::InvalidChannels {
                expected: 1,
                got: channels,
            })?;

        let spec = WavSpec {
            channels: channel_count,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec)
            .map_err(|e| VgmError::EncodeError(e.to_string()))?;

        Ok(WavEncoder {
            writer: Some(writer),
            sample_rate,
            channels,
        })
    }

    /// Rate written to the WAV header
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved channels per frame
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples written so far, all channels counted
    pub fn samples_written(&self) -> u32 {
        self.writer.as_ref().map(|w| w.len()).unwrap_or(0)
    }
}

impl super::Encoder for WavEncoder {
    fn encode(&mut self, frame: &AudioFrame) -> VgmResult<()> {
        if frame.sample_rate() != self.sample_rate {
            return Err(VgmError::InvalidSampleRate {
                rate: frame.sample_rate(),
            });
        }

        if frame.channels() != self.channels {
            return Err(VgmError::InvalidChannels {
                expected: self.channels,
                got: frame.channels(),
            });
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| VgmError::EncodeError("WAV already finalized".to_string()))?;

        for &sample in frame.samples() {
            writer
                .write_sample(sample)
                .map_err(|e| VgmError::EncodeError(e.to_string()))?;
        }

        Ok(())
    }

    fn finalize(&mut self) -> VgmResult<()> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .map_err(|e| VgmError::EncodeError(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use tempfile::NamedTempFile;

    #[test]
    fn test_wav_encoder_write() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 44100, 2).unwrap();

        let frame = AudioFrame::new(vec![0, 100, -100, 32767], 44100, 2, 0).unwrap();
        encoder.encode(&frame).unwrap();
        assert_eq!(encoder.samples_written(), 4);
        encoder.finalize().unwrap();

        let mut reader = hound::WavReader::open(temp_file.path()).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 100, -100, 32767]);
    }

    #[test]
    fn test_wav_encoder_rejects_frames_after_finalize() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 22050, 1).unwrap();
        encoder.finalize().unwrap();

        let frame = AudioFrame::new(vec![1, 2], 22050, 1, 0).unwrap();
        assert!(matches!(encoder.encode(&frame), Err(VgmError::EncodeError(_))));
        assert_eq!(encoder.samples_written(), 0);
    }

    #[test]
    fn test_wav_encoder_zero_channels() {
        let temp_file = NamedTempFile::new().unwrap();
        assert!(WavEncoder::new(temp_file.path(), 44100, 0).is_err());
    }

    #[test]
    fn test_wav_encoder_invalid_sample_rate() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 44100, 1).unwrap();

        let frame = AudioFrame::new(vec![0, 1], 48000, 1, 0).unwrap();
        assert!(encoder.encode(&frame).is_err());
    }

    #[test]
    fn test_wav_encoder_invalid_channels() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 44100, 1).unwrap();

        let frame = AudioFrame::new(vec![0, 1, 2, 3], 44100, 2, 0).unwrap();
        assert!(encoder.encode(&frame).is_err());
    }
}
