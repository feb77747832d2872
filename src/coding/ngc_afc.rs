//! Nintendo AFC 4-bit ADPCM

use super::{clamp16, high_nibble_signed, low_nibble_signed, read_frame};
use crate::core::{Sample, VgmStreamChannel};

const FRAME_SIZE: usize = 9;
const SAMPLES_PER_FRAME: usize = 16;

const AFC_COEF: [[i16; 2]; 16] = [
    [0x0000, 0x0000],
    [0x0800, 0x0000],
    [0x0000, 0x0800],
    [0x0400, 0x0400],
    [0x1000, -0x0800],
    [0x0e00, -0x0600],
    [0x0c00, -0x0400],
    [0x1200, -0x0a00],
    [0x1068, -0x08c8],
    [0x12c0, -0x08fc],
    [0x1400, -0x0c00],
    [0x0800, -0x0800],
    [0x0400, -0x0400],
    [-0x0400, 0x0400],
    [-0x0400, 0x0000],
    [-0x0800, 0x0000],
];

/// Decode AFC ADPCM from the frame holding `first_sample`
pub fn decode_ngc_afc(
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

        let scale = 1i32 << ((frame[0] >> 4) & 0xf);
        let [coef1, coef2] = AFC_COEF[(frame[0] & 0xf) as usize];

        let in_frame = i % SAMPLES_PER_FRAME;
        let byte = frame[1 + in_frame / 2];
        let nibble = if in_frame & 1 == 1 {
            low_nibble_signed(byte)
        } else {
            high_nibble_signed(byte)
        };

        let sample = clamp16(
            (((nibble * scale) << 11) + coef1 as i32 * hist1 + coef2 as i32 * hist2) >> 11,
        );
        outbuf[produced * channel_spacing] = sample;
        hist2 = hist1;
        hist1 = sample as i32;
        produced += 1;
    }

    stream.adpcm_history1_16 = hist1 as i16;
    stream.adpcm_history2_16 = hist2 as i16;
    produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;

    #[test]
    fn test_afc_frame_pair() {
        // Two frames: scale 2^1 with zero coefs, then coef 1 (previous sample) with scale 1
        let mut data = vec![0x10, 0x12, 0, 0, 0, 0, 0, 0, 0];
        data.extend_from_slice(&[0x01, 0x10, 0, 0, 0, 0, 0, 0, 0]);
        let mut ch = VgmStreamChannel {
            streamfile: Some(MemoryStreamFile::new("afc.bin", data).into_ref()),
            ..Default::default()
        };

        let mut out = [0i16; 18];
        assert_eq!(decode_ngc_afc(&mut ch, &mut out, 1, 0, 18), 18);
        assert_eq!(&out[..3], &[2, 4, 0]);
        assert_eq!(out[16], 1);
        assert_eq!(out[17], 1);
    }
}
