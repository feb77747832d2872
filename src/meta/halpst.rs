//! HAL Laboratory HALPST (`.hps`)

use super::{not_format, open_channels};
use crate::coding::ngc_dsp::dsp_nibbles_to_samples;
use crate::core::{BlockedLayout, CodingType, LayoutType, MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::layout::blocked::halpst_block_update;
use crate::streamfile::{StreamFileExt, StreamFileRef};
use log::debug;

/// Offset of the first block
const FIRST_BLOCK: u64 = 0x80;
/// Size of each per-channel header entry
const CHANNEL_HEADER_SIZE: u64 = 0x38;

/// Where the block chain goes after its last block
struct ChainInfo {
    /// Per-channel samples before the block the chain jumps back to
    loop_start: Option<usize>,
}

/// Follow the chain of blocks from the first one. A next pointer that goes
/// backwards marks the loop; a negative one ends the stream.
fn walk_chain(sf: &StreamFileRef, channels: usize) -> VgmResult<ChainInfo> {
    let mut visited: Vec<(u64, usize)> = Vec::new();
    let mut offset = FIRST_BLOCK as i64;

    while visited.last().is_none_or(|&(last, _)| offset > last as i64) {
        let block = offset as u64;
        let size = sf.read_u32_be(block)? as usize / channels;
        visited.push((block, size));
        offset = sf.read_i32_be(block + 8)? as i64;
    }

    if offset < 0 {
        return Ok(ChainInfo { loop_start: None });
    }

    let mut samples = 0;
    for &(block, size) in &visited {
        if block == offset as u64 {
            return Ok(ChainInfo {
                loop_start: Some(samples),
            });
        }
        samples += CodingType::NgcDsp.samples_in_bytes(size);
    }

    debug!("HALPST chain jumps to {:#x}, which is not a block start", offset);
    Ok(ChainInfo { loop_start: None })
}

/// Parse a HALPST header, walk its block chain for the loop and position the
/// session on the first block
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    if !sf.check_id(0, b" HAL") || !sf.check_id(4, b"PST\0") {
        return Err(not_format("HALPST"));
    }

    let channels = sf.read_u32_be(0xc)? as usize;
    if !(1..=2).contains(&channels) {
        return Err(VgmError::InvalidChannels {
            expected: 2,
            got: channels,
        });
    }

    // Each channel header repeats the nibble count; they must agree
    let num_samples = dsp_nibbles_to_samples(sf.read_u32_be(0x18)? as usize) + 1;
    if channels == 2 {
        let right = dsp_nibbles_to_samples(sf.read_u32_be(0x18 + CHANNEL_HEADER_SIZE)? as usize) + 1;
        if right != num_samples {
            return Err(VgmError::InvalidMetadata(format!(
                "HALPST channel lengths differ: {} vs {}",
                num_samples, right
            )));
        }
    }

    let chain = walk_chain(sf, channels)?;

    let mut vgm = VgmStream::allocate(channels, chain.loop_start.is_some())?;
    vgm.meta_type = MetaType::Halpst;
    vgm.coding_type = CodingType::NgcDsp;
    vgm.layout_type = LayoutType::Blocked(BlockedLayout::Halpst);
    vgm.sample_rate = sf.read_u32_be(8)?;
    vgm.num_samples = num_samples;
    vgm.loop_start_sample = chain.loop_start.unwrap_or(0);
    vgm.loop_end_sample = num_samples;

    open_channels(&mut vgm, sf, FIRST_BLOCK, 0);
    for (j, ch) in vgm.ch.iter_mut().enumerate() {
        let base = 0x20 + CHANNEL_HEADER_SIZE * j as u64;
        for (i, coef) in ch.adpcm_coef.iter_mut().enumerate() {
            *coef = sf.read_i16_be(base + i as u64 * 2)?;
        }
    }
    halpst_block_update(FIRST_BLOCK, &mut vgm)?;

    Ok(vgm)
}
