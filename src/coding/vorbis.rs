use crate::core::Sample;
use crate::error::{VgmError, VgmResult};
use crate::streamfile::{filename_extension, StreamFileRef};
use log::{debug, trace};
use std::io::{self, Read, Seek, SeekFrom};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL, CODEC_TYPE_VORBIS};
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::{MetadataOptions, MetadataRevision};
use symphonia::core::probe::Hint;

/// Lets symphonia read from a [`StreamFileRef`]
struct StreamFileSource {
    sf: StreamFileRef,
    pos: u64,
}

impl Read for StreamFileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.sf.read_at(self.pos, buf);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for StreamFileSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(d) => self.sf.size().checked_add_signed(d),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
        };
        self.pos = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of stream")
        })?;
        Ok(self.pos)
    }
}

impl MediaSource for StreamFileSource {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Some(self.sf.size())
    }
}

/// Stream properties read while opening an Ogg Vorbis source
#[derive(Debug, Clone)]
pub struct VorbisInfo {
    /// Sample rate
    pub sample_rate: u32,
    /// Number of channels
    pub channels: usize,
    /// Total frames in the stream
    pub n_frames: u64,
    /// Comment tags as (key, value)
    pub tags: Vec<(String, String)>,
}

impl VorbisInfo {
    /// Value of the first tag named `key` (ASCII case-insensitive)
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Symphonia-backed Ogg Vorbis decoder state owned by a session
pub struct VorbisCodecData {
    /// Container reader
    reader: Box<dyn FormatReader>,
    /// Codec state
    decoder: Box<dyn Decoder>,
    /// Track being decoded
    track_id: u32,
    /// Number of channels
    channels: usize,
    /// Last decoded packet, interleaved
    buffer: Option<SampleBuffer<i16>>,
    /// Samples of `buffer` already handed out
    buffer_pos: usize,
    /// Frames to drop after a seek landed before its target
    skip_frames: u64,
}

fn collect_tags(revision: Option<&MetadataRevision>, tags: &mut Vec<(String, String)>) {
    if let Some(revision) = revision {
        for tag in revision.tags() {
            tags.push((tag.key.clone(), tag.value.to_string()));
        }
    }
}

impl VorbisCodecData {
    /// Open an Ogg Vorbis stream
    pub fn open(sf: StreamFileRef) -> VgmResult<(Self, VorbisInfo)> {
        let mut hint = Hint::new();
        let extension = filename_extension(sf.name()).to_string();
        if !extension.is_empty() {
            hint.with_extension(&extension);
        }

        let source = StreamFileSource { sf, pos: 0 };
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let mut probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| VgmError::UnsupportedFormat(e.to_string()))?;

        let mut tags = Vec::new();
        if let Some(metadata) = probed.metadata.get() {
            collect_tags(metadata.current(), &mut tags);
        }
        collect_tags(probed.format.metadata().current(), &mut tags);

        let reader = probed.format;

        // Find the first audio track
        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| VgmError::InvalidMetadata("No audio track found".to_string()))?
            .clone();

        let codec_params = &track.codec_params;
        if codec_params.codec != CODEC_TYPE_VORBIS {
            return Err(VgmError::UnsupportedFormat("Ogg stream is not Vorbis".to_string()));
        }
        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| VgmError::InvalidMetadata("Unknown sample rate".to_string()))?;
        let channels = codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| VgmError::InvalidMetadata("Unknown channel count".to_string()))?;

        let decoder = symphonia::default::get_codecs()
            .make(codec_params, &DecoderOptions::default())
            .map_err(|e| VgmError::DecodeError(e.to_string()))?;

        let mut data = VorbisCodecData {
            reader,
            decoder,
            track_id: track.id,
            channels,
            buffer: None,
            buffer_pos: 0,
            skip_frames: 0,
        };

        let n_frames = match codec_params.n_frames {
            Some(n) => n,
            None => {
                debug!("Ogg stream has no frame count, decoding to measure it");
                let n = data.count_frames()?;
                data.seek(0)?;
                n
            }
        };

        let info = VorbisInfo {
            sample_rate,
            channels,
            n_frames,
            tags,
        };
        Ok((data, info))
    }

    fn count_frames(&mut self) -> VgmResult<u64> {
        let mut frames = 0u64;
        while self.next_buffer()? {
            if let Some(buffer) = &self.buffer {
                frames += (buffer.samples().len() / self.channels) as u64;
            }
        }
        Ok(frames)
    }

    /// Decode the next packet of our track into `buffer`. False at end of stream.
    fn next_buffer(&mut self) -> VgmResult<bool> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(symphonia::core::errors::Error::DecodeError(e)) => {
                    // Skip decode errors and try next packet
                    trace!("Skipping bad Vorbis packet: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let frames = decoded.capacity();
            let too_small = self
                .buffer
                .as_ref()
                .is_none_or(|b| b.capacity() < frames * spec.channels.count());
            if too_small {
                self.buffer = Some(SampleBuffer::<i16>::new(frames as u64, spec));
            }
            let Some(buffer) = self.buffer.as_mut() else {
                continue;
            };
            buffer.copy_interleaved_ref(decoded);
            self.buffer_pos = 0;

            if self.skip_frames > 0 {
                let available = (buffer.samples().len() / self.channels) as u64;
                let skip = self.skip_frames.min(available);
                self.buffer_pos = skip as usize * self.channels;
                self.skip_frames -= skip;
            }
            return Ok(true);
        }
    }

    /// Fill `out` with interleaved samples, returning the frames produced
    pub fn decode(&mut self, out: &mut [Sample], channels: usize) -> VgmResult<usize> {
        if channels != self.channels {
            return Err(VgmError::InvalidChannels {
                expected: self.channels,
                got: channels,
            });
        }

        let mut written = 0;
        while written < out.len() {
            let available = self
                .buffer
                .as_ref()
                .map_or(0, |b| b.samples().len().saturating_sub(self.buffer_pos));
            if available == 0 {
                if !self.next_buffer()? {
                    break;
                }
                continue;
            }

            let Some(buffer) = &self.buffer else { break };
            let count = available.min(out.len() - written);
            out[written..written + count]
                .copy_from_slice(&buffer.samples()[self.buffer_pos..self.buffer_pos + count]);
            self.buffer_pos += count;
            written += count;
        }

        Ok(written / self.channels)
    }

    /// Position the decoder so the next decoded frame is `sample`
    pub fn seek(&mut self, sample: usize) -> VgmResult<()> {
        let seeked = self.reader.seek(
            SeekMode::Accurate,
            SeekTo::TimeStamp {
                ts: sample as u64,
                track_id: self.track_id,
            },
        )?;
        self.decoder.reset();
        self.buffer_pos = self.buffer.as_ref().map_or(0, |b| b.samples().len());
        self.skip_frames = seeked.required_ts.saturating_sub(seeked.actual_ts);
        trace!(
            "Vorbis seek to {} landed at {}",
            seeked.required_ts,
            seeked.actual_ts
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;

    #[test]
    fn test_not_ogg() {
        let sf = MemoryStreamFile::new("x.ogg", vec![0u8; 64]).into_ref();
        assert!(VorbisCodecData::open(sf).is_err());
    }

    #[test]
    fn test_source_seek() {
        let sf = MemoryStreamFile::new("x.ogg", vec![1u8, 2, 3, 4]).into_ref();
        let mut source = StreamFileSource { sf, pos: 0 };
        assert_eq!(source.seek(SeekFrom::End(-1)).unwrap(), 3);
        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 4);
        assert!(source.seek(SeekFrom::Current(-10)).is_err());
    }
}
