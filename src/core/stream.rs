use super::types::{CodingType, LayoutType, MetaType, Sample};
use crate::coding::vorbis::VorbisCodecData;
use crate::error::{VgmError, VgmResult};
use crate::layout::segmented::SegmentedData;
use crate::streamfile::StreamFileRef;
use log::{debug, warn};
use std::fmt;

/// Most channels a session can hold
pub const MAX_CHANNELS: usize = 64;

/// Per-channel decode state: read cursor plus codec-private scalars
#[derive(Debug, Clone, Default)]
pub struct VgmStreamChannel {
    /// Byte source this channel reads from, possibly shared with other channels
    pub streamfile: Option<StreamFileRef>,
    /// Offset of this channel's first byte of data
    pub channel_start_offset: u64,
    /// Read cursor, at the start of the current block for this channel
    pub offset: u64,
    /// Predictor coefficients (DSP: 8 pairs, ADX: first pair)
    pub adpcm_coef: [i16; 16],
    /// Previous sample, 16-bit history codecs
    pub adpcm_history1_16: i16,
    /// Sample before previous, 16-bit history codecs
    pub adpcm_history2_16: i16,
    /// Previous sample, 32-bit history codecs
    pub adpcm_history1_32: i32,
    /// Sample before previous, 32-bit history codecs
    pub adpcm_history2_32: i32,
    /// IMA step table index
    pub adpcm_step_index: i32,
}

/// Where in the byte source the next samples come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockPosition {
    /// Absolute index of the next sample to render
    pub current_sample: usize,
    /// Samples already consumed in the current block
    pub samples_into_block: usize,
    /// Offset of the current block header; `None` once the block chain ran off the end
    pub current_block_offset: Option<u64>,
    /// Per-channel data bytes in the current block
    pub current_block_size: usize,
    /// Offset of the next block header
    pub next_block_offset: Option<u64>,
}

/// Full copy of per-channel and position state
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Per-channel state
    pub channels: Vec<VgmStreamChannel>,
    /// Top-level position
    pub position: BlockPosition,
}

/// Codec state that does not fit the per-channel shape
#[derive(Default)]
pub enum CodecData {
    /// Nothing beyond the per-channel state
    #[default]
    None,
    /// External Ogg Vorbis decoder
    Vorbis(Box<VorbisCodecData>),
    /// Owned child sessions for the segmented layout
    Segmented(SegmentedData),
}

impl fmt::Debug for CodecData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecData::None => write!(f, "None"),
            CodecData::Vorbis(_) => write!(f, "Vorbis(..)"),
            CodecData::Segmented(data) => f
                .debug_struct("Segmented")
                .field("segments", &data.segment_count())
                .field("current_segment", &data.current_segment)
                .finish(),
        }
    }
}

impl CodecData {
    /// Rewind codec side data to the start of the stream
    pub fn reset(&mut self) -> VgmResult<()> {
        match self {
            CodecData::None => Ok(()),
            CodecData::Vorbis(data) => data.seek(0),
            CodecData::Segmented(data) => {
                data.reset();
                Ok(())
            }
        }
    }
}

/// One open audio stream: tags, geometry, live decode state and snapshots
#[derive(Debug)]
pub struct VgmStream {
    /// Header parser that built this session
    pub meta_type: MetaType,
    /// Decode routine family
    pub coding_type: CodingType,
    /// Block stepping strategy
    pub layout_type: LayoutType,
    /// Samples per second
    pub sample_rate: u32,
    /// Total samples per channel
    pub num_samples: usize,
    /// Whether the stream loops
    pub loop_flag: bool,
    /// First sample of the loop
    pub loop_start_sample: usize,
    /// Sample after the last one of the loop
    pub loop_end_sample: usize,
    /// Per-channel bytes in one interleave block
    pub interleave_block_size: usize,
    /// Per-channel bytes in the final, short interleave block
    pub interleave_smallblock_size: usize,
    /// Live per-channel state
    pub ch: Vec<VgmStreamChannel>,
    /// Codec side data
    pub codec_data: CodecData,
    pub(crate) pos: BlockPosition,
    pub(crate) start: Snapshot,
    pub(crate) loop_snapshot: Option<Snapshot>,
}

impl VgmStream {
    /// Allocate a session with zeroed per-channel state.
    ///
    /// Recognizers fill in the tags, geometry and channel cursors afterwards.
    pub fn allocate(channels: usize, loop_flag: bool) -> VgmResult<Self> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(VgmError::InvalidChannels {
                expected: channels.clamp(1, MAX_CHANNELS),
                got: channels,
            });
        }

        Ok(VgmStream {
            meta_type: MetaType::Raw,
            coding_type: CodingType::Pcm16Le,
            layout_type: LayoutType::None,
            sample_rate: 0,
            num_samples: 0,
            loop_flag,
            loop_start_sample: 0,
            loop_end_sample: 0,
            interleave_block_size: 0,
            interleave_smallblock_size: 0,
            ch: vec![VgmStreamChannel::default(); channels],
            codec_data: CodecData::None,
            pos: BlockPosition::default(),
            start: Snapshot::default(),
            loop_snapshot: None,
        })
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.ch.len()
    }

    /// Current position
    pub fn position(&self) -> &BlockPosition {
        &self.pos
    }

    /// Mutable position, for recognizers and block parsers positioning the first block
    pub fn position_mut(&mut self) -> &mut BlockPosition {
        &mut self.pos
    }

    /// Record the current state as the start of the stream
    pub(crate) fn capture_start(&mut self) {
        self.start = Snapshot {
            channels: self.ch.clone(),
            position: self.pos,
        };
        self.loop_snapshot = None;
    }

    /// Rewind to the recorded start, or record the current state as the
    /// start when none was taken yet
    pub(crate) fn rewind_or_mark_start(&mut self) {
        if self.start.channels.is_empty() {
            self.capture_start();
        } else {
            self.reset();
        }
    }

    /// Rewind to the state right after detection.
    ///
    /// Byte sources are not reopened. A codec that fails to rewind its side
    /// data is logged and left where it is.
    pub fn reset(&mut self) {
        self.ch.clone_from(&self.start.channels);
        self.pos = self.start.position;
        self.loop_snapshot = None;

        if let Err(e) = self.codec_data.reset() {
            warn!("Codec side data failed to rewind: {}", e);
        }
    }

    /// Release the session and every byte source it holds
    pub fn close(self) {
        debug!(
            "Closing {} ({} channels)",
            self.meta_type.description(),
            self.channels()
        );
    }

    /// Stop looping; the stream ends at `num_samples`
    pub fn disable_loop(&mut self) {
        self.loop_flag = false;
        self.loop_snapshot = None;
    }

    /// Total samples a player should render for the given loop count and fade
    pub fn play_samples(&self, loop_count: f64, fade_seconds: f64, fade_delay_seconds: f64) -> usize {
        if !self.loop_flag {
            return self.num_samples;
        }

        let loop_len = (self.loop_end_sample - self.loop_start_sample) as f64;
        let fade = (fade_delay_seconds + fade_seconds) * self.sample_rate as f64;
        (self.loop_start_sample as f64 + loop_len * loop_count + fade) as usize
    }

    /// Render interleaved samples into `buffer`, returning the frames written.
    ///
    /// A non-looped stream stops at `num_samples`; the rest of the buffer is
    /// zero-filled and the return value reports the frames actually produced.
    pub fn render(&mut self, buffer: &mut [Sample]) -> VgmResult<usize> {
        let channels = self.channels();
        if buffer.len() % channels != 0 {
            return Err(VgmError::BufferError(format!(
                "Buffer of {} samples is not a multiple of {} channels",
                buffer.len(),
                channels
            )));
        }

        let mut frames = buffer.len() / channels;
        if !self.loop_flag {
            frames = frames.min(self.num_samples.saturating_sub(self.pos.current_sample));
        }

        let written = crate::layout::render(self, &mut buffer[..frames * channels], frames)?;
        buffer[written * channels..].fill(0);
        Ok(written)
    }
}
