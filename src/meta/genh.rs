//! GENH: generic header prepended to headerless data

use super::{not_format, open_channels};
use crate::core::{CodingType, LayoutType, MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::streamfile::{StreamFileExt, StreamFileRef};

/// Channel counts past this are corrupt headers
const GENH_MAX_CHANNELS: usize = 16;

/// Codec numbers used by the `coding` field
fn coding_from_id(id: u32) -> VgmResult<CodingType> {
    let coding = match id {
        0 => CodingType::Psx,
        3 => CodingType::Pcm16Be,
        4 => CodingType::Pcm16Le,
        5 => CodingType::Pcm8,
        7 => CodingType::DviIma,
        9 => CodingType::Ima,
        12 => CodingType::NgcDsp,
        13 => CodingType::Pcm8UInt,
        14 => CodingType::PsxBadflags,
        _ => {
            return Err(VgmError::InvalidMetadata(format!(
                "Unsupported GENH codec {}",
                id
            )));
        }
    };
    Ok(coding)
}

/// Parse a GENH header.
///
/// Fields are little endian; `loop_start` of -1 means no loop and
/// `loop_end` doubles as the sample count.
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    if !sf.check_id(0, b"GENH") {
        return Err(not_format("GENH"));
    }

    let channels = sf.read_u32_le(0x4)? as usize;
    let interleave = sf.read_u32_le(0x8)? as usize;
    let sample_rate = sf.read_u32_le(0xc)?;
    let loop_start = sf.read_i32_le(0x10)?;
    let loop_end = sf.read_u32_le(0x14)? as usize;
    let coding_type = coding_from_id(sf.read_u32_le(0x18)?)?;
    let start_offset = sf.read_u32_le(0x1c)? as u64;
    let header_size = sf.read_u32_le(0x20)? as u64;

    if header_size > start_offset || loop_end == 0 {
        return Err(VgmError::InvalidMetadata("Inconsistent GENH header".to_string()));
    }

    if !(1..=GENH_MAX_CHANNELS).contains(&channels) {
        return Err(VgmError::InvalidChannels {
            expected: GENH_MAX_CHANNELS,
            got: channels,
        });
    }

    let loop_flag = loop_start != -1;
    let mut vgm = VgmStream::allocate(channels, loop_flag)?;
    vgm.meta_type = MetaType::Genh;
    vgm.coding_type = coding_type;
    vgm.sample_rate = sample_rate;
    vgm.num_samples = loop_end;
    if loop_flag {
        vgm.loop_start_sample = usize::try_from(loop_start).map_err(|_| {
            VgmError::InvalidMetadata(format!("Negative GENH loop start {}", loop_start))
        })?;
        vgm.loop_end_sample = loop_end;
    }

    // (distance between channel starts, whether channels alternate in blocks)
    let (step, interleaved) = match coding_type {
        // Interleaved every sample inside the decoder
        CodingType::Pcm8UInt => (1, false),
        CodingType::NgcDsp => {
            if channels > 2 {
                return Err(VgmError::InvalidChannels {
                    expected: 2,
                    got: channels,
                });
            }
            match sf.read_u32_le(0x2c)? {
                0 => (interleave as u64, true),
                // Channels stored one after the other
                2 => ((loop_end.div_ceil(14) * 8) as u64, false),
                kind => {
                    return Err(VgmError::InvalidMetadata(format!(
                        "Unsupported GENH DSP interleave type {}",
                        kind
                    )));
                }
            }
        }
        _ => (interleave as u64, true),
    };

    if channels > 1 && interleaved {
        if interleave == 0 {
            return Err(VgmError::InvalidMetadata(
                "Multichannel GENH without interleave".to_string(),
            ));
        }
        vgm.layout_type = LayoutType::Interleave;
        vgm.interleave_block_size = interleave;
    }

    open_channels(&mut vgm, sf, start_offset, step);

    if coding_type == CodingType::NgcDsp {
        let little_endian = sf.read_u32_le(0x30)? & 1 != 0;
        for (j, ch) in vgm.ch.iter_mut().enumerate() {
            let coef_offset = sf.read_u32_le(0x24 + j as u64 * 4)? as u64;
            for (i, coef) in ch.adpcm_coef.iter_mut().enumerate() {
                let at = coef_offset + i as u64 * 2;
                *coef = if little_endian {
                    sf.read_i16_le(at)?
                } else {
                    sf.read_i16_be(at)?
                };
            }
        }
    }

    Ok(vgm)
}
