//! IMA and Intel DVI 4-bit ADPCM

use super::{clamp16, read_frame};
use crate::core::{Sample, VgmStreamChannel};

const ADPCM_STEP: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

const ADPCM_INDEX: [i32; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

fn decode(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
    high_nibble_first: bool,
) -> usize {
    let mut hist1 = stream.adpcm_history1_32;
    let mut step_index = stream.adpcm_step_index.clamp(0, 88);
    let mut byte = [0u8; 1];
    let mut loaded = None;
    let mut produced = 0;

    for i in first_sample..first_sample + samples_to_do {
        let byte_index = i / 2;
        if loaded != Some(byte_index) {
            if !read_frame(stream, stream.offset + byte_index as u64, &mut byte) {
                break;
            }
            loaded = Some(byte_index);
        }

        let second = i & 1 == 1;
        let shift = if second == high_nibble_first { 0 } else { 4 };
        let nibble = ((byte[0] >> shift) & 0xf) as i32;

        let step = ADPCM_STEP[step_index as usize];
        let delta = step * (nibble & 7) * 2 + step;
        let decoded = if nibble & 8 != 0 {
            (hist1 << 3) - delta
        } else {
            (hist1 << 3) + delta
        };
        hist1 = clamp16(decoded >> 3) as i32;

        step_index = (step_index + ADPCM_INDEX[nibble as usize]).clamp(0, 88);
        outbuf[produced * channel_spacing] = hist1 as Sample;
        produced += 1;
    }

    stream.adpcm_history1_32 = hist1;
    stream.adpcm_step_index = step_index;
    produced
}

/// Decode IMA ADPCM, low nibble first
pub fn decode_ima(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    decode(stream, outbuf, channel_spacing, first_sample, samples_to_do, false)
}

/// Decode Intel DVI IMA ADPCM, high nibble first
pub fn decode_dvi_ima(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    decode(stream, outbuf, channel_spacing, first_sample, samples_to_do, true)
}
