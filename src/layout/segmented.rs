use super::decode_step;
use crate::core::{CodecData, LayoutType, MetaType, Sample, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::looping;
use log::debug;

/// Child sessions played back to back, owned by the parent session
#[derive(Debug)]
pub struct SegmentedData {
    segments: Vec<VgmStream>,
    sample_counts: Vec<usize>,
    /// Segment currently rendering
    pub current_segment: usize,
    /// Segment the loop jumps back to
    pub loop_segment: usize,
    /// Carry ADPCM history from each segment into the next
    pub carry_history: bool,
}

impl SegmentedData {
    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Child sessions in playback order
    pub fn segments(&self) -> &[VgmStream] {
        &self.segments
    }

    /// Samples in each segment
    pub fn sample_counts(&self) -> &[usize] {
        &self.sample_counts
    }

    /// Rewind every segment and start from the first
    pub fn reset(&mut self) {
        self.current_segment = 0;
        for segment in &mut self.segments {
            segment.reset();
        }
    }

    /// Copy the last history of segment `index - 1` into segment `index`
    fn carry_into(&mut self, index: usize) {
        if !self.carry_history || index == 0 {
            return;
        }
        let (before, after) = self.segments.split_at_mut(index);
        let previous = &before[index - 1];
        for (next, prev) in after[0].ch.iter_mut().zip(&previous.ch) {
            next.adpcm_history1_16 = prev.adpcm_history1_16;
            next.adpcm_history2_16 = prev.adpcm_history2_16;
            next.adpcm_history1_32 = prev.adpcm_history1_32;
            next.adpcm_history2_32 = prev.adpcm_history2_32;
        }
    }

    /// Move to the following segment; false on the last one
    fn advance(&mut self) -> bool {
        if self.current_segment + 1 >= self.segments.len() {
            return false;
        }
        self.current_segment += 1;
        self.segments[self.current_segment].reset();
        self.carry_into(self.current_segment);
        true
    }

    /// Jump back to the loop segment
    fn enter_loop_segment(&mut self) {
        self.current_segment = self.loop_segment;
        self.segments[self.loop_segment].reset();
        self.carry_into(self.loop_segment);
    }
}

/// Builds a segmented session out of already-detected child sessions
#[derive(Debug)]
pub struct SegmentedBuilder {
    segments: Vec<VgmStream>,
    loop_segments: Option<(usize, usize)>,
    carry_history: bool,
    meta_type: MetaType,
}

impl Default for SegmentedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentedBuilder {
    /// Start an empty builder
    pub fn new() -> Self {
        SegmentedBuilder {
            segments: Vec::new(),
            loop_segments: None,
            carry_history: false,
            meta_type: MetaType::Txtp,
        }
    }

    /// Append a segment
    pub fn segment(mut self, segment: VgmStream) -> Self {
        self.segments.push(segment);
        self
    }

    /// Loop from the start of segment `start` to the end of segment `end` (0-based, inclusive)
    pub fn loop_segments(mut self, start: usize, end: usize) -> Self {
        self.loop_segments = Some((start, end));
        self
    }

    /// Carry ADPCM history across segment boundaries
    pub fn carry_history(mut self, carry: bool) -> Self {
        self.carry_history = carry;
        self
    }

    /// Format tag reported by the built session
    pub fn meta_type(mut self, meta_type: MetaType) -> Self {
        self.meta_type = meta_type;
        self
    }

    /// Validate the segments and build the parent session
    pub fn build(self) -> VgmResult<VgmStream> {
        let Some(first) = self.segments.first() else {
            return Err(VgmError::InvalidMetadata("No segments".to_string()));
        };
        let channels = first.channels();
        let sample_rate = first.sample_rate;
        let coding_type = first.coding_type;

        for segment in &self.segments {
            if segment.channels() != channels {
                return Err(VgmError::InvalidChannels {
                    expected: channels,
                    got: segment.channels(),
                });
            }
            if segment.sample_rate != sample_rate {
                return Err(VgmError::InvalidMetadata(format!(
                    "Segment sample rate {} differs from {}",
                    segment.sample_rate, sample_rate
                )));
            }
        }

        let mut segments = self.segments;
        for segment in &mut segments {
            segment.disable_loop();
            segment.rewind_or_mark_start();
        }
        let sample_counts: Vec<usize> = segments.iter().map(|s| s.num_samples).collect();
        let num_samples = sample_counts.iter().sum();

        let (loop_flag, loop_start_sample, loop_end_sample, loop_segment) = match self.loop_segments {
            Some((start, end)) => {
                if start > end || end >= segments.len() {
                    return Err(VgmError::InvalidMetadata(format!(
                        "Loop segments {}..={} out of range for {} segments",
                        start,
                        end,
                        segments.len()
                    )));
                }
                let loop_start: usize = sample_counts[..start].iter().sum();
                let loop_end: usize = sample_counts[..=end].iter().sum();
                (true, loop_start, loop_end, start)
            }
            None => (false, 0, 0, 0),
        };

        debug!(
            "Segmented session: {} segments, {} samples",
            segments.len(),
            num_samples
        );

        let mut vgm = VgmStream::allocate(channels, loop_flag)?;
        vgm.meta_type = self.meta_type;
        vgm.coding_type = coding_type;
        vgm.layout_type = LayoutType::Segmented;
        vgm.sample_rate = sample_rate;
        vgm.num_samples = num_samples;
        vgm.loop_start_sample = loop_start_sample;
        vgm.loop_end_sample = loop_end_sample;
        vgm.codec_data = CodecData::Segmented(SegmentedData {
            segments,
            sample_counts,
            current_segment: 0,
            loop_segment,
            carry_history: self.carry_history,
        });
        vgm.capture_start();
        Ok(vgm)
    }
}

fn segmented_data(vgm: &mut VgmStream) -> VgmResult<&mut SegmentedData> {
    match &mut vgm.codec_data {
        CodecData::Segmented(data) => Ok(data),
        _ => Err(VgmError::DecodeError(
            "Segmented layout without segments".to_string(),
        )),
    }
}

/// Render the active segment's samples into the parent's output range
pub fn decode_segment(
    vgm: &mut VgmStream,
    samples_written: usize,
    samples_to_do: usize,
    buffer: &mut [Sample],
) -> VgmResult<usize> {
    let channels = vgm.channels();
    let data = segmented_data(vgm)?;
    let segment = &mut data.segments[data.current_segment];

    let out = &mut buffer[samples_written * channels..(samples_written + samples_to_do) * channels];
    super::render(segment, out, samples_to_do)
}

/// Render a stream made of consecutive child sessions
pub fn render(vgm: &mut VgmStream, buffer: &mut [Sample], sample_count: usize) -> VgmResult<usize> {
    let mut samples_written = 0;

    while samples_written < sample_count {
        let samples_this_block = {
            let data = segmented_data(vgm)?;
            data.sample_counts[data.current_segment]
        };

        if vgm.loop_flag && looping::do_loop(vgm) {
            segmented_data(vgm)?.enter_loop_segment();
            continue;
        }

        let samples_to_do = looping::samples_to_do(samples_this_block, 1, vgm)
            .min(sample_count - samples_written);
        if samples_to_do == 0 {
            break;
        }

        let done = decode_step(vgm, samples_written, samples_to_do, buffer)?;
        samples_written += done;
        if done < samples_to_do {
            break;
        }

        if vgm.pos.samples_into_block == samples_this_block && segmented_data(vgm)?.advance() {
            vgm.pos.samples_into_block = 0;
        }
    }

    Ok(samples_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CodingType;
    use crate::streamfile::MemoryStreamFile;

    fn pcm_segment(values: &[i16]) -> VgmStream {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut vgm = VgmStream::allocate(1, false).unwrap();
        vgm.coding_type = CodingType::Pcm16Le;
        vgm.sample_rate = 22050;
        vgm.num_samples = values.len();
        vgm.ch[0].streamfile = Some(MemoryStreamFile::new("seg.raw", data).into_ref());
        vgm.capture_start();
        vgm
    }

    #[test]
    fn test_segments_play_in_order_and_loop() {
        let mut vgm = SegmentedBuilder::new()
            .segment(pcm_segment(&[1, 2]))
            .segment(pcm_segment(&[3, 4, 5]))
            .segment(pcm_segment(&[6]))
            .loop_segments(1, 2)
            .build()
            .unwrap();

        assert_eq!(vgm.num_samples, 6);
        assert_eq!(vgm.loop_start_sample, 2);
        assert_eq!(vgm.loop_end_sample, 6);

        let mut buf = [0i16; 12];
        assert_eq!(vgm.render(&mut buf).unwrap(), 12);
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 3, 4, 5, 6, 3, 4]);
    }

    #[test]
    fn test_rejects_mismatched_channels() {
        let mut stereo = pcm_segment(&[1, 2]);
        stereo.ch.push(stereo.ch[0].clone());
        let result = SegmentedBuilder::new()
            .segment(pcm_segment(&[1]))
            .segment(stereo)
            .build();
        assert!(matches!(result, Err(VgmError::InvalidChannels { .. })));
    }

    #[test]
    fn test_rejects_bad_loop_range() {
        let result = SegmentedBuilder::new()
            .segment(pcm_segment(&[1]))
            .loop_segments(0, 1)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_reset_restarts_first_segment() {
        let mut vgm = SegmentedBuilder::new()
            .segment(pcm_segment(&[1, 2]))
            .segment(pcm_segment(&[3]))
            .build()
            .unwrap();
        let mut buf = [0i16; 3];
        vgm.render(&mut buf).unwrap();
        vgm.reset();
        let mut again = [0i16; 3];
        assert_eq!(vgm.render(&mut again).unwrap(), 3);
        assert_eq!(again, [1, 2, 3]);
    }
}
