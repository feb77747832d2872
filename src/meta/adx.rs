//! CRI ADX

use super::{not_format, open_channels};
use crate::coding::adx::{FRAME_SIZE, adx_coefficients};
use crate::core::{CodingType, LayoutType, MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::streamfile::{StreamFileExt, StreamFileRef};

/// Parse an ADX header (versions 3 and 4)
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    if sf.read_u16_be(0)? != 0x8000 {
        return Err(not_format("ADX"));
    }

    let stream_offset = sf.read_u16_be(2)? as u64 + 4;
    let mut copyright = [0u8; 6];
    sf.read_exact_at(stream_offset.saturating_sub(6), &mut copyright)?;
    if &copyright != b"(c)CRI" {
        return Err(not_format("ADX"));
    }

    // Standard ADX: type 3, 18-byte frames, 4-bit samples
    if sf.read_u8(4)? != 3 || sf.read_u8(5)? != FRAME_SIZE as u8 || sf.read_u8(6)? != 4 {
        return Err(VgmError::InvalidMetadata("Unsupported ADX encoding".to_string()));
    }

    let channels = sf.read_u8(7)? as usize;
    let sample_rate = sf.read_u32_be(8)?;
    let num_samples = sf.read_u32_be(0xc)? as usize;
    let cutoff = sf.read_u16_be(0x10)? as u32;
    let header_size = stream_offset - 6;

    let (meta_type, loop_info) = match sf.read_u8(0x12)? {
        3 => {
            let loop_info = if header_size >= 0x2c {
                Some((sf.read_u32_be(0x18)?, sf.read_u32_be(0x1c)?, sf.read_u32_be(0x24)?))
            } else {
                None
            };
            (MetaType::Adx03, loop_info)
        }
        4 => {
            let loop_info = if header_size >= 0x38 {
                Some((sf.read_u32_be(0x24)?, sf.read_u32_be(0x28)?, sf.read_u32_be(0x30)?))
            } else {
                None
            };
            (MetaType::Adx04, loop_info)
        }
        version => {
            return Err(VgmError::InvalidMetadata(format!(
                "Unsupported ADX version {}",
                version
            )));
        }
    };

    let (loop_flag, loop_start, loop_end) = match loop_info {
        Some((flag, start, end)) if flag != 0 => (true, start as usize, end as usize),
        _ => (false, 0, 0),
    };

    let mut vgm = VgmStream::allocate(channels, loop_flag)?;
    vgm.meta_type = meta_type;
    vgm.coding_type = CodingType::CriAdx;
    vgm.sample_rate = sample_rate;
    vgm.num_samples = num_samples;
    vgm.loop_start_sample = loop_start;
    vgm.loop_end_sample = loop_end;
    if channels > 1 {
        vgm.layout_type = LayoutType::Interleave;
        vgm.interleave_block_size = FRAME_SIZE;
    }

    let (coef1, coef2) = adx_coefficients(cutoff, sample_rate);
    open_channels(&mut vgm, sf, stream_offset, FRAME_SIZE as u64);
    for ch in &mut vgm.ch {
        ch.adpcm_coef[0] = coef1;
        ch.adpcm_coef[1] = coef2;
    }

    Ok(vgm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;

    fn adx_header(version: u8, loop_flag: u32) -> Vec<u8> {
        let stream_offset = 0x40u16;
        let mut data = vec![0u8; stream_offset as usize + FRAME_SIZE * 4];
        data[0..2].copy_from_slice(&0x8000u16.to_be_bytes());
        data[2..4].copy_from_slice(&(stream_offset - 4).to_be_bytes());
        data[4] = 3;
        data[5] = 18;
        data[6] = 4;
        data[7] = 2;
        data[8..12].copy_from_slice(&44100u32.to_be_bytes());
        data[0xc..0x10].copy_from_slice(&64u32.to_be_bytes());
        data[0x10..0x12].copy_from_slice(&500u16.to_be_bytes());
        data[0x12] = version;
        data[0x24..0x28].copy_from_slice(&loop_flag.to_be_bytes());
        data[0x28..0x2c].copy_from_slice(&32u32.to_be_bytes());
        data[0x30..0x34].copy_from_slice(&64u32.to_be_bytes());
        data[0x3a..0x40].copy_from_slice(b"(c)CRI");
        data
    }

    #[test]
    fn test_adx_v4_loop() {
        let sf = MemoryStreamFile::new("bgm.adx", adx_header(4, 1)).into_ref();
        let vgm = init(&sf).unwrap();
        assert_eq!(vgm.meta_type, MetaType::Adx04);
        assert_eq!(vgm.layout_type, LayoutType::Interleave);
        assert!(vgm.loop_flag);
        assert_eq!((vgm.loop_start_sample, vgm.loop_end_sample), (32, 64));
        assert_eq!(vgm.ch[1].offset, 0x40 + 18);
        assert_eq!(vgm.ch[0].adpcm_coef[0], 7334);
    }

    #[test]
    fn test_requires_copyright() {
        let mut data = adx_header(4, 0);
        data[0x3a] = b'x';
        let sf = MemoryStreamFile::new("bgm.adx", data).into_ref();
        assert!(init(&sf).is_err());
    }
}
