//! Headerless `.raw`: 44100 Hz stereo little-endian 16-bit PCM

use super::{open_channels, require_extension};
use crate::core::{CodingType, MetaType, VgmStream};
use crate::error::VgmResult;
use crate::streamfile::StreamFileRef;

const SAMPLE_RATE: u32 = 44100;
const CHANNELS: usize = 2;

/// Accept any `.raw` file as 16-bit stereo PCM
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    require_extension(sf, &["raw"])?;

    let mut vgm = VgmStream::allocate(CHANNELS, false)?;
    vgm.meta_type = MetaType::Raw;
    vgm.coding_type = CodingType::Pcm16LeInt;
    vgm.sample_rate = SAMPLE_RATE;
    vgm.num_samples = (sf.size() / (2 * CHANNELS as u64)) as usize;

    open_channels(&mut vgm, sf, 0, 2);
    Ok(vgm)
}
