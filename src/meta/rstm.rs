//! Nintendo RSTM (Wii streams)

use super::{not_format, open_channels};
use crate::core::{CodingType, LayoutType, MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::streamfile::{StreamFileExt, StreamFileRef};

/// Distance between the DSP coefficient tables of consecutive channels
const COEF_SPACING: u64 = 0x38;

/// Parse an RSTM header
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    if !sf.check_id(0, b"RSTM") || sf.read_u32_be(4)? != 0xfeff_0100 {
        return Err(not_format("RSTM"));
    }

    let head = sf.read_u32_be(0x10)? as u64;
    if !sf.check_id(head, b"HEAD") {
        return Err(VgmError::InvalidMetadata("RSTM without HEAD chunk".to_string()));
    }

    let coding_type = match sf.read_u8(head + 0x20)? {
        0 => CodingType::Pcm8,
        1 => CodingType::Pcm16Be,
        2 => CodingType::NgcDsp,
        codec => {
            return Err(VgmError::InvalidMetadata(format!(
                "Unknown RSTM codec {}",
                codec
            )));
        }
    };
    let loop_flag = sf.read_u8(head + 0x21)? != 0;
    let channels = sf.read_u8(head + 0x22)? as usize;

    let mut vgm = VgmStream::allocate(channels, loop_flag)?;
    vgm.meta_type = MetaType::Rstm;
    vgm.coding_type = coding_type;
    vgm.layout_type = LayoutType::InterleaveShortblock;
    vgm.sample_rate = sf.read_u16_be(head + 0x24)? as u32;
    vgm.loop_start_sample = sf.read_u32_be(head + 0x28)? as usize;
    vgm.num_samples = sf.read_u32_be(head + 0x2c)? as usize;
    vgm.loop_end_sample = vgm.num_samples;
    vgm.interleave_block_size = sf.read_u32_be(head + 0x38)? as usize;
    vgm.interleave_smallblock_size = sf.read_u32_be(head + 0x48)? as usize;

    if coding_type == CodingType::NgcDsp {
        let table = sf.read_u32_be(head + 0x1c)? as u64;
        let coefs = sf.read_u32_be(head + 0x10 + table)? as u64 + 0x10;
        for (j, ch) in vgm.ch.iter_mut().enumerate() {
            let base = head + coefs + j as u64 * COEF_SPACING;
            for (i, coef) in ch.adpcm_coef.iter_mut().enumerate() {
                *coef = sf.read_i16_be(base + i as u64 * 2)?;
            }
        }
    }

    let start_offset = sf.read_u32_be(head + 0x30)? as u64;
    let step = vgm.interleave_block_size as u64;
    open_channels(&mut vgm, sf, start_offset, step);

    Ok(vgm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;

    /// Stereo PCM16BE RSTM, 3 samples per channel, 4-byte interleave
    fn rstm() -> Vec<u8> {
        let head = 0x40usize;
        let start = 0x100usize;
        let mut data = vec![0u8; start];
        data[0..4].copy_from_slice(b"RSTM");
        data[4..8].copy_from_slice(&0xfeff_0100u32.to_be_bytes());
        data[0x10..0x14].copy_from_slice(&(head as u32).to_be_bytes());
        data[head..head + 4].copy_from_slice(b"HEAD");
        data[head + 0x20] = 1;
        data[head + 0x21] = 1;
        data[head + 0x22] = 2;
        data[head + 0x24..head + 0x26].copy_from_slice(&32000u16.to_be_bytes());
        data[head + 0x28..head + 0x2c].copy_from_slice(&1u32.to_be_bytes());
        data[head + 0x2c..head + 0x30].copy_from_slice(&3u32.to_be_bytes());
        data[head + 0x30..head + 0x34].copy_from_slice(&(start as u32).to_be_bytes());
        data[head + 0x38..head + 0x3c].copy_from_slice(&4u32.to_be_bytes());
        data[head + 0x48..head + 0x4c].copy_from_slice(&2u32.to_be_bytes());
        for v in [1i16, 2, -1, -2, 3, -3] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data
    }

    #[test]
    fn test_rstm_shortblock() {
        let sf = MemoryStreamFile::new("song.brstm", rstm()).into_ref();
        let mut vgm = init(&sf).unwrap();
        vgm.capture_start();
        assert_eq!(vgm.layout_type, LayoutType::InterleaveShortblock);
        assert_eq!((vgm.loop_start_sample, vgm.loop_end_sample), (1, 3));

        let mut buf = [0i16; 6];
        assert_eq!(vgm.render(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, -1, 2, -2, 3, -3]);
    }
}
