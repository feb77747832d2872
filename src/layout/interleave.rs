use super::decode_step;
use crate::core::{LayoutType, Sample, VgmStream};
use crate::error::VgmResult;
use crate::looping;

/// Samples in one full interleave block
pub fn samples_per_block(vgm: &VgmStream) -> usize {
    vgm.coding_type.samples_in_bytes(vgm.interleave_block_size)
}

/// Samples in the final short block
pub fn samples_per_short_block(vgm: &VgmStream) -> usize {
    vgm.coding_type.samples_in_bytes(vgm.interleave_smallblock_size)
}

/// True when the block starting `samples_this_block` samples before the
/// current block end would run past the end of the stream
fn in_short_block(vgm: &VgmStream, block_start: usize, samples_this_block: usize) -> bool {
    vgm.layout_type == LayoutType::InterleaveShortblock
        && block_start + samples_this_block > vgm.num_samples
}

/// Render a stream whose channels alternate in fixed-size blocks
pub fn render(vgm: &mut VgmStream, buffer: &mut [Sample], sample_count: usize) -> VgmResult<usize> {
    let samples_per_frame = vgm.coding_type.samples_per_frame();
    let mut samples_this_block = samples_per_block(vgm);

    let block_start = vgm.pos.current_sample - vgm.pos.samples_into_block;
    if in_short_block(vgm, block_start, samples_this_block) {
        samples_this_block = samples_per_short_block(vgm);
    }

    let mut samples_written = 0;
    while samples_written < sample_count {
        if vgm.loop_flag && looping::do_loop(vgm) {
            // The loop never starts inside the short block
            samples_this_block = samples_per_block(vgm);
            continue;
        }

        let samples_to_do = looping::samples_to_do(samples_this_block, samples_per_frame, vgm)
            .min(sample_count - samples_written);
        if samples_to_do == 0 {
            break;
        }

        let done = decode_step(vgm, samples_written, samples_to_do, buffer)?;
        samples_written += done;
        if done < samples_to_do {
            break;
        }

        if vgm.pos.samples_into_block == samples_this_block {
            let channels = vgm.channels();
            let block_size = vgm.interleave_block_size as u64;

            if in_short_block(vgm, vgm.pos.current_sample, samples_this_block) {
                samples_this_block = samples_per_short_block(vgm);
                let small_size = vgm.interleave_smallblock_size as u64;
                for (chan, stream) in vgm.ch.iter_mut().enumerate() {
                    let chan = chan as u64;
                    stream.offset += block_size * (channels as u64 - chan) + small_size * chan;
                }
            } else {
                for stream in vgm.ch.iter_mut() {
                    stream.offset += block_size * channels as u64;
                }
            }
            vgm.pos.samples_into_block = 0;
        }
    }

    Ok(samples_written)
}
