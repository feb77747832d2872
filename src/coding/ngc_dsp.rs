//! Nintendo DSP 4-bit ADPCM

use super::{clamp16, high_nibble_signed, low_nibble_signed, read_frame};
use crate::core::{Sample, VgmStreamChannel};

/// Bytes per DSP frame: one header byte plus 7 bytes of nibbles
pub const FRAME_SIZE: usize = 8;
/// Samples per DSP frame
pub const SAMPLES_PER_FRAME: usize = 14;

/// Decode DSP ADPCM from the frame holding `first_sample`
pub fn decode_ngc_dsp(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    let mut hist1 = stream.adpcm_history1_16 as i32;
    let mut hist2 = stream.adpcm_history2_16 as i32;
    let mut frame = [0u8; FRAME_SIZE];
    let mut loaded = None;
    let mut produced = 0;

    for i in first_sample..first_sample + samples_to_do {
        let frame_index = i / SAMPLES_PER_FRAME;
        if loaded != Some(frame_index) {
            let offset = stream.offset + (frame_index * FRAME_SIZE) as u64;
            if !read_frame(stream, offset, &mut frame) {
                break;
            }
            loaded = Some(frame_index);
        }

        let scale = 1i32 << (frame[0] & 0xf);
        let coef_index = ((frame[0] >> 4) & 0xf) as usize;
        // Indexes past the 8 stored pairs come from corrupt headers
        let coef1 = stream.adpcm_coef.get(coef_index * 2).copied().unwrap_or(0) as i64;
        let coef2 = stream.adpcm_coef.get(coef_index * 2 + 1).copied().unwrap_or(0) as i64;

        let in_frame = i % SAMPLES_PER_FRAME;
        let byte = frame[1 + in_frame / 2];
        let nibble = if in_frame & 1 == 1 {
            low_nibble_signed(byte)
        } else {
            high_nibble_signed(byte)
        };

        // Header coefficients at the i16 extremes overflow an i32 predictor
        let predicted = coef1 * hist1 as i64 + coef2 * hist2 as i64;
        let sample = clamp16(((((nibble * scale) << 11) as i64 + 1024 + predicted) >> 11) as i32);
        outbuf[produced * channel_spacing] = sample;
        hist2 = hist1;
        hist1 = sample as i32;
        produced += 1;
    }

    stream.adpcm_history1_16 = hist1 as i16;
    stream.adpcm_history2_16 = hist2 as i16;
    produced
}

/// Samples held by a DSP nibble count (nibble counts include frame headers)
pub fn dsp_nibbles_to_samples(nibbles: usize) -> usize {
    let whole_frames = nibbles / 16;
    let remainder = nibbles % 16;
    whole_frames * SAMPLES_PER_FRAME + remainder.saturating_sub(2)
}

/// Nibble address of a sample, inverse of [`dsp_nibbles_to_samples`]
pub fn dsp_samples_to_nibbles(samples: usize) -> usize {
    let whole_frames = samples / SAMPLES_PER_FRAME;
    let remainder = samples % SAMPLES_PER_FRAME;
    whole_frames * 16 + if remainder > 0 { remainder + 2 } else { 0 }
}
