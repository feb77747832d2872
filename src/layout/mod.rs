//! Block stepping strategies
//!
//! Every strategy runs the same loop: act on a loop boundary, ask how many
//! samples fit before the next boundary, decode them, advance the position
//! and cross into the next block when the current one is used up.

pub mod blocked;
pub mod flat;
pub mod interleave;
pub mod segmented;

use crate::coding;
use crate::core::{LayoutType, Sample, VgmStream};
use crate::error::VgmResult;
use log::warn;

/// Render `sample_count` frames into `buffer` with the session's layout,
/// returning the frames produced
pub fn render(vgm: &mut VgmStream, buffer: &mut [Sample], sample_count: usize) -> VgmResult<usize> {
    match vgm.layout_type {
        LayoutType::None => flat::render(vgm, buffer, sample_count),
        LayoutType::Interleave | LayoutType::InterleaveShortblock => {
            interleave::render(vgm, buffer, sample_count)
        }
        LayoutType::Blocked(_) => blocked::render(vgm, buffer, sample_count),
        LayoutType::Segmented => segmented::render(vgm, buffer, sample_count),
    }
}

/// Decode one step and advance the position by what was produced
pub(crate) fn decode_step(
    vgm: &mut VgmStream,
    samples_written: usize,
    samples_to_do: usize,
    buffer: &mut [Sample],
) -> VgmResult<usize> {
    let done = coding::decode(vgm, samples_written, samples_to_do, buffer)?;
    vgm.pos.current_sample += done;
    vgm.pos.samples_into_block += done;

    if done < samples_to_do {
        warn!(
            "Source ran out at sample {} ({} of {} samples decoded)",
            vgm.pos.current_sample, done, samples_to_do
        );
    }
    Ok(done)
}

/// Zero `count` frames starting at frame `from`
pub(crate) fn fill_silence(buffer: &mut [Sample], channels: usize, from: usize, count: usize) {
    buffer[from * channels..(from + count) * channels].fill(0);
}
