//! PlayStation 4-bit ADPCM (VAG)

use super::{clamp16, read_frame};
use crate::core::{Sample, VgmStreamChannel};

/// Bytes per frame: predictor/shift, flags and 14 bytes of nibbles
pub const FRAME_SIZE: usize = 16;
/// Samples per frame
pub const SAMPLES_PER_FRAME: usize = 28;

const VAG_F: [[f64; 2]; 5] = [
    [0.0, 0.0],
    [60.0 / 64.0, 0.0],
    [115.0 / 64.0, -52.0 / 64.0],
    [98.0 / 64.0, -55.0 / 64.0],
    [122.0 / 64.0, -60.0 / 64.0],
];

/// Frame flag value marking the end of data
pub const FLAG_END: u8 = 0x07;

fn decode(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
    honor_flags: bool,
) -> usize {
    let mut hist1 = stream.adpcm_history1_32;
    let mut hist2 = stream.adpcm_history2_32;
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

        let predict = (frame[0] >> 4) as usize;
        let shift = (frame[0] & 0xf) as u32;
        let flag = frame[1];
        let [f0, f1] = VAG_F.get(predict).copied().unwrap_or([0.0, 0.0]);

        let mut sample = 0i32;
        if !honor_flags || flag < FLAG_END {
            let in_frame = i % SAMPLES_PER_FRAME;
            let byte = frame[2 + in_frame / 2];
            let nibble = if in_frame & 1 == 1 { byte >> 4 } else { byte & 0x0f };
            let scale = ((nibble as u16) << 12) as i16 as i32;
            sample = ((scale >> shift.min(31)) as f64 + hist1 as f64 * f0 + hist2 as f64 * f1) as i32;
        }

        outbuf[produced * channel_spacing] = clamp16(sample);
        hist2 = hist1;
        hist1 = sample;
        produced += 1;
    }

    stream.adpcm_history1_32 = hist1;
    stream.adpcm_history2_32 = hist2;
    produced
}

/// Decode PSX ADPCM; frames flagged as end-of-data decode to silence
pub fn decode_psx(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    decode(stream, outbuf, channel_spacing, first_sample, samples_to_do, true)
}

/// Decode PSX ADPCM ignoring frame flags
pub fn decode_psx_badflags(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    decode(stream, outbuf, channel_spacing, first_sample, samples_to_do, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;

    fn channel(data: Vec<u8>) -> VgmStreamChannel {
        VgmStreamChannel {
            streamfile: Some(MemoryStreamFile::new("vag.bin", data).into_ref()),
            ..Default::default()
        }
    }

    fn frame(header: u8, flag: u8, first: u8) -> Vec<u8> {
        let mut f = vec![0u8; FRAME_SIZE];
        f[0] = header;
        f[1] = flag;
        f[2] = first;
        f
    }

    #[test]
    fn test_shift_and_nibble_order() {
        // shift 12: nibble value is the sample; low nibble comes first
        let mut ch = channel(frame(0x0C, 0, 0xF1));
        let mut out = [0i16; 3];
        assert_eq!(decode_psx(&mut ch, &mut out, 1, 0, 3), 3);
        assert_eq!(out, [1, -1, 0]);
    }

    #[test]
    fn test_end_flag_silences_unless_badflags() {
        let mut ch = channel(frame(0x0C, FLAG_END, 0x03));
        let mut out = [0i16; 1];
        decode_psx(&mut ch, &mut out, 1, 0, 1);
        assert_eq!(out[0], 0);

        let mut ch = channel(frame(0x0C, FLAG_END, 0x03));
        decode_psx_badflags(&mut ch, &mut out, 1, 0, 1);
        assert_eq!(out[0], 3);
    }

    #[test]
    fn test_history_is_unclamped() {
        // predictor 1 (60/64) with history above the 16-bit range
        let mut ch = channel(frame(0x1C, 0, 0x00));
        ch.adpcm_history1_32 = 64000;
        let mut out = [0i16; 1];
        decode_psx(&mut ch, &mut out, 1, 0, 1);
        assert_eq!(out[0], 32767);
        assert_eq!(ch.adpcm_history1_32, 60000);
        assert_eq!(ch.adpcm_history2_32, 64000);
    }
}
