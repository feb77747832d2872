use super::{decode_step, fill_silence};
use crate::core::{BlockedLayout, LayoutType, Sample, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::looping;
use crate::streamfile::{StreamFileExt, StreamFileRef};
use log::{debug, warn};

/// Size of an AST `BLCK` header
const AST_BLOCK_HEADER: u64 = 0x20;
/// Size of a HALPST block header
const HALPST_BLOCK_HEADER: u64 = 0x20;

fn header_source(vgm: &VgmStream) -> VgmResult<StreamFileRef> {
    vgm.ch
        .first()
        .and_then(|ch| ch.streamfile.clone())
        .ok_or_else(|| VgmError::InvalidMetadata("Blocked layout without a byte source".to_string()))
}

/// Parse the AST `BLCK` header at `block_offset` and point every channel into it
pub fn ast_block_update(block_offset: u64, vgm: &mut VgmStream) -> VgmResult<()> {
    let sf = header_source(vgm)?;
    if !sf.check_id(block_offset, b"BLCK") {
        return Err(VgmError::InvalidMetadata(format!(
            "No BLCK header at {:#x}",
            block_offset
        )));
    }
    let block_size = sf.read_u32_be(block_offset + 4)? as u64;
    let channels = vgm.channels() as u64;

    vgm.pos.current_block_offset = Some(block_offset);
    vgm.pos.current_block_size = block_size as usize;
    vgm.pos.next_block_offset = Some(block_offset + AST_BLOCK_HEADER + block_size * channels);
    for (i, ch) in vgm.ch.iter_mut().enumerate() {
        ch.offset = block_offset + AST_BLOCK_HEADER + block_size * i as u64;
    }
    Ok(())
}

/// Parse the HALPST block header at `block_offset` and point every channel into it.
///
/// The header holds the data size of all channels at +0 and the offset of the
/// next block at +8, with `-1` ending the chain.
pub fn halpst_block_update(block_offset: u64, vgm: &mut VgmStream) -> VgmResult<()> {
    let sf = header_source(vgm)?;
    let channels = vgm.channels() as u64;
    let block_size = sf.read_u32_be(block_offset)? as u64 / channels;
    let next = sf.read_i32_be(block_offset + 8)?;

    vgm.pos.current_block_offset = Some(block_offset);
    vgm.pos.current_block_size = block_size as usize;
    vgm.pos.next_block_offset = u64::try_from(next).ok();
    for (i, ch) in vgm.ch.iter_mut().enumerate() {
        ch.offset = block_offset + HALPST_BLOCK_HEADER + block_size * i as u64;
    }
    Ok(())
}

/// Run the block header parser for `layout` at `block_offset`
pub fn block_update(layout: BlockedLayout, block_offset: u64, vgm: &mut VgmStream) -> VgmResult<()> {
    match layout {
        BlockedLayout::Ast => ast_block_update(block_offset, vgm),
        BlockedLayout::Halpst => halpst_block_update(block_offset, vgm),
    }
}

/// Move to the next block, or mark the chain as run off the end
fn next_block(vgm: &mut VgmStream, layout: BlockedLayout) {
    if vgm.pos.current_block_offset.is_none() {
        return;
    }
    let Some(next) = vgm.pos.next_block_offset else {
        debug!("Block chain ended at sample {}", vgm.pos.current_sample);
        vgm.pos.current_block_offset = None;
        return;
    };

    if let Err(e) = block_update(layout, next, vgm) {
        warn!("Block at {:#x} unreadable, rendering silence: {}", next, e);
        vgm.pos.current_block_offset = None;
    }
}

fn samples_this_block(vgm: &VgmStream) -> usize {
    vgm.coding_type.samples_in_bytes(vgm.pos.current_block_size)
}

/// Render a stream made of self-describing blocks
pub fn render(vgm: &mut VgmStream, buffer: &mut [Sample], sample_count: usize) -> VgmResult<usize> {
    let LayoutType::Blocked(layout) = vgm.layout_type else {
        return Err(VgmError::DecodeError(format!(
            "{} is not a blocked layout",
            vgm.layout_type.description()
        )));
    };
    let channels = vgm.channels();
    let samples_per_frame = vgm.coding_type.samples_per_frame();
    let mut samples_written = 0;

    while samples_written < sample_count {
        if vgm.loop_flag && looping::do_loop(vgm) {
            continue;
        }

        let valid = vgm.pos.current_block_offset.is_some();
        let block_samples = if valid {
            samples_this_block(vgm)
        } else {
            // Off the end: the rest of the request is one silent block
            vgm.pos.samples_into_block + (sample_count - samples_written)
        };

        let samples_to_do = looping::samples_to_do(block_samples, samples_per_frame, vgm)
            .min(sample_count - samples_written);
        if samples_to_do == 0 {
            if valid && block_samples == 0 {
                next_block(vgm, layout);
                vgm.pos.samples_into_block = 0;
                if vgm.pos.current_block_offset.is_some() && samples_this_block(vgm) == 0 {
                    warn!("Empty block at sample {}", vgm.pos.current_sample);
                    break;
                }
                continue;
            }
            break;
        }

        if valid {
            let done = decode_step(vgm, samples_written, samples_to_do, buffer)?;
            samples_written += done;
            if done < samples_to_do {
                break;
            }
        } else {
            fill_silence(buffer, channels, samples_written, samples_to_do);
            samples_written += samples_to_do;
            vgm.pos.current_sample += samples_to_do;
            vgm.pos.samples_into_block += samples_to_do;
        }

        if vgm.pos.samples_into_block == block_samples {
            next_block(vgm, layout);
            vgm.pos.samples_into_block = 0;
        }
    }

    Ok(samples_written)
}
