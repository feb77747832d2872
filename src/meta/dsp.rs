//! Standard Nintendo DSP header (`.dsp`)

use super::{open_channels, require_extension};
use crate::coding::ngc_dsp::dsp_nibbles_to_samples;
use crate::core::{CodingType, MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::streamfile::{StreamFileExt, StreamFileRef};

/// Size of the header; sample data follows it
pub const HEADER_SIZE: u64 = 0x60;

/// Fields of the 0x60-byte header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DspHeader {
    /// Samples in the stream
    pub sample_count: u32,
    /// Nibbles in the stream, frame headers included
    pub nibble_count: u32,
    /// Sample rate
    pub sample_rate: u32,
    /// Loop flag
    pub loop_flag: u16,
    /// Always 0 for DSP ADPCM
    pub format: u16,
    /// Nibble address of the loop start
    pub loop_start_offset: u32,
    /// Nibble address of the loop end
    pub loop_end_offset: u32,
    /// Predictor coefficients
    pub coef: [i16; 16],
    /// Always 0
    pub gain: u16,
    /// Predictor/scale of the first frame
    pub initial_ps: u16,
    /// Initial history
    pub initial_hist1: i16,
    /// Initial history
    pub initial_hist2: i16,
    /// Predictor/scale of the loop start frame
    pub loop_ps: u16,
}

impl DspHeader {
    /// Read the header at `offset`
    pub fn read(sf: &StreamFileRef, offset: u64) -> VgmResult<Self> {
        let mut coef = [0i16; 16];
        for (i, c) in coef.iter_mut().enumerate() {
            *c = sf.read_i16_be(offset + 0x1c + i as u64 * 2)?;
        }

        Ok(DspHeader {
            sample_count: sf.read_u32_be(offset)?,
            nibble_count: sf.read_u32_be(offset + 4)?,
            sample_rate: sf.read_u32_be(offset + 8)?,
            loop_flag: sf.read_u16_be(offset + 0xc)?,
            format: sf.read_u16_be(offset + 0xe)?,
            loop_start_offset: sf.read_u32_be(offset + 0x10)?,
            loop_end_offset: sf.read_u32_be(offset + 0x14)?,
            coef,
            gain: sf.read_u16_be(offset + 0x3c)?,
            initial_ps: sf.read_u16_be(offset + 0x3e)?,
            initial_hist1: sf.read_i16_be(offset + 0x40)?,
            initial_hist2: sf.read_i16_be(offset + 0x42)?,
            loop_ps: sf.read_u16_be(offset + 0x44)?,
        })
    }
}

/// Parse a standard DSP header.
///
/// The header has no magic number, so every field that can be cross-checked
/// against the data is.
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    require_extension(sf, &["dsp"])?;
    let header = DspHeader::read(sf, 0)?;

    if header.format != 0 || header.gain != 0 {
        return Err(VgmError::InvalidMetadata("DSP format or gain is not 0".to_string()));
    }
    if header.initial_ps != sf.read_u8(HEADER_SIZE)? as u16 {
        return Err(VgmError::InvalidMetadata(
            "DSP initial predictor/scale does not match the first frame".to_string(),
        ));
    }
    if header.sample_count as usize > dsp_nibbles_to_samples(header.nibble_count as usize) {
        return Err(VgmError::InvalidMetadata(
            "DSP sample count exceeds its nibble count".to_string(),
        ));
    }

    let loop_flag = header.loop_flag != 0;
    if loop_flag {
        let loop_frame = header.loop_start_offset as u64 / 16 * 8;
        if header.loop_ps != sf.read_u8(HEADER_SIZE + loop_frame)? as u16 {
            return Err(VgmError::InvalidMetadata(
                "DSP loop predictor/scale does not match the loop frame".to_string(),
            ));
        }
    }

    let mut vgm = VgmStream::allocate(1, loop_flag)?;
    vgm.meta_type = MetaType::DspStd;
    vgm.coding_type = CodingType::NgcDsp;
    vgm.sample_rate = header.sample_rate;
    vgm.num_samples = header.sample_count as usize;
    vgm.loop_start_sample = dsp_nibbles_to_samples(header.loop_start_offset as usize);
    vgm.loop_end_sample = dsp_nibbles_to_samples(header.loop_end_offset as usize) + 1;

    open_channels(&mut vgm, sf, HEADER_SIZE, 0);
    let ch = &mut vgm.ch[0];
    ch.adpcm_coef = header.coef;
    ch.adpcm_history1_16 = header.initial_hist1;
    ch.adpcm_history2_16 = header.initial_hist2;

    Ok(vgm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;

    /// Mono DSP of 4 frames (56 samples) looping over the last three
    fn dsp() -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE as usize + 32];
        data[0..4].copy_from_slice(&56u32.to_be_bytes());
        data[4..8].copy_from_slice(&64u32.to_be_bytes());
        data[8..0xc].copy_from_slice(&32000u32.to_be_bytes());
        data[0xc..0xe].copy_from_slice(&1u16.to_be_bytes());
        data[0x10..0x14].copy_from_slice(&18u32.to_be_bytes());
        data[0x14..0x18].copy_from_slice(&63u32.to_be_bytes());
        data[0x3e..0x40].copy_from_slice(&0x12u16.to_be_bytes());
        data[0x44..0x46].copy_from_slice(&0x34u16.to_be_bytes());
        data[0x60] = 0x12;
        data[0x68] = 0x34;
        data
    }

    #[test]
    fn test_dsp_header() {
        let sf = MemoryStreamFile::new("sfx.dsp", dsp()).into_ref();
        let vgm = init(&sf).unwrap();
        assert_eq!(vgm.num_samples, 56);
        assert_eq!(vgm.loop_start_sample, 14);
        assert_eq!(vgm.loop_end_sample, 56);
        assert_eq!(vgm.ch[0].offset, HEADER_SIZE);
    }

    #[test]
    fn test_mismatched_loop_ps() {
        let mut data = dsp();
        data[0x68] = 0x35;
        let sf = MemoryStreamFile::new("sfx.dsp", data).into_ref();
        assert!(init(&sf).is_err());
    }

    #[test]
    fn test_requires_extension() {
        let sf = MemoryStreamFile::new("sfx.bin", dsp()).into_ref();
        assert!(init(&sf).is_err());
    }
}
