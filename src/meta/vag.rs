//! Sony VAG (`VAGp`, mono)

use super::{not_format, open_channels, require_extension};
use crate::coding::psx::{FRAME_SIZE, SAMPLES_PER_FRAME};
use crate::core::{CodingType, MetaType, VgmStream};
use crate::error::VgmResult;
use crate::streamfile::{StreamFileExt, StreamFileRef};

/// Offset of the first frame
const DATA_OFFSET: u64 = 0x30;
/// Frame flag opening the loop
const FLAG_LOOP_START: u8 = 0x06;
/// Frame flag closing the loop
const FLAG_LOOP_END: u8 = 0x03;

/// Find the first loop-start and loop-end frames in `frames` frames of data
fn scan_loop_flags(sf: &StreamFileRef, frames: usize) -> VgmResult<Option<(usize, usize)>> {
    let mut start = None;
    for frame in 0..frames {
        let flag = sf.read_u8(DATA_OFFSET + (frame * FRAME_SIZE) as u64 + 1)?;
        match flag {
            FLAG_LOOP_START if start.is_none() => start = Some(frame),
            FLAG_LOOP_END => return Ok(start.map(|start| (start, frame))),
            _ => {}
        }
    }
    Ok(None)
}

/// Parse a VAG header; the loop comes from the frame flags
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    require_extension(sf, &["vag"])?;
    if !sf.check_id(0, b"VAGp") {
        return Err(not_format("VAGp"));
    }

    let data_size = sf.read_u32_be(0xc)? as usize;
    let frames = data_size / FRAME_SIZE;
    let loop_frames = scan_loop_flags(sf, frames)?;

    let mut vgm = VgmStream::allocate(1, loop_frames.is_some())?;
    vgm.meta_type = MetaType::Ps2VagP;
    vgm.coding_type = CodingType::Psx;
    vgm.sample_rate = sf.read_u32_be(0x10)?;
    vgm.num_samples = frames * SAMPLES_PER_FRAME;
    if let Some((start, end)) = loop_frames {
        vgm.loop_start_sample = start * SAMPLES_PER_FRAME;
        vgm.loop_end_sample = (end + 1) * SAMPLES_PER_FRAME;
    }

    open_channels(&mut vgm, sf, DATA_OFFSET, 0);
    Ok(vgm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;

    fn vag(flags: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; DATA_OFFSET as usize];
        data[0..4].copy_from_slice(b"VAGp");
        data[0xc..0x10].copy_from_slice(&((flags.len() * FRAME_SIZE) as u32).to_be_bytes());
        data[0x10..0x14].copy_from_slice(&22050u32.to_be_bytes());
        for &flag in flags {
            let mut frame = [0u8; FRAME_SIZE];
            frame[1] = flag;
            data.extend_from_slice(&frame);
        }
        data
    }

    #[test]
    fn test_loop_from_flags() {
        let sf = MemoryStreamFile::new("voice.vag", vag(&[0, 6, 2, 3, 7])).into_ref();
        let vgm = init(&sf).unwrap();
        assert_eq!(vgm.num_samples, 5 * 28);
        assert!(vgm.loop_flag);
        assert_eq!((vgm.loop_start_sample, vgm.loop_end_sample), (28, 4 * 28));
    }

    #[test]
    fn test_no_loop() {
        let sf = MemoryStreamFile::new("voice.vag", vag(&[0, 0, 7])).into_ref();
        let vgm = init(&sf).unwrap();
        assert!(!vgm.loop_flag);
    }
}
