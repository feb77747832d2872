//! CRI ADX 4-bit ADPCM

use super::{clamp16, high_nibble_signed, low_nibble_signed, read_frame};
use crate::core::{Sample, VgmStreamChannel};
use byteorder::{BigEndian, ByteOrder};

/// Bytes per ADX frame: 2-byte scale plus 16 bytes of nibbles
pub const FRAME_SIZE: usize = 18;
/// Samples per ADX frame
pub const SAMPLES_PER_FRAME: usize = 32;

/// Prediction coefficients derived from the header's highpass cutoff
pub fn adx_coefficients(cutoff: u32, sample_rate: u32) -> (i16, i16) {
    let x = cutoff as f64;
    let y = sample_rate as f64;
    let z = (2.0 * std::f64::consts::PI * x / y).cos();
    let a = std::f64::consts::SQRT_2 - z;
    let b = std::f64::consts::SQRT_2 - 1.0;
    let c = (a - ((a + b) * (a - b)).sqrt()) / b;

    ((c * 8192.0).floor() as i16, (c * c * -4096.0).floor() as i16)
}

/// Decode ADX ADPCM from the frame holding `first_sample`
pub fn decode_adx(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    let mut hist1 = stream.adpcm_history1_32;
    let mut hist2 = stream.adpcm_history2_32;
    let coef1 = stream.adpcm_coef[0] as i32;
    let coef2 = stream.adpcm_coef[1] as i32;
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

        let scale = BigEndian::read_i16(&frame[..2]) as i32 + 1;
        let in_frame = i % SAMPLES_PER_FRAME;
        let byte = frame[2 + in_frame / 2];
        let nibble = if in_frame & 1 == 1 {
            low_nibble_signed(byte)
        } else {
            high_nibble_signed(byte)
        };

        let sample = clamp16(nibble * scale + ((coef1 * hist1 + coef2 * hist2) >> 12));
        outbuf[produced * channel_spacing] = sample;
        hist2 = hist1;
        hist1 = sample as i32;
        produced += 1;
    }

    stream.adpcm_history1_32 = hist1;
    stream.adpcm_history2_32 = hist2;
    produced
}
