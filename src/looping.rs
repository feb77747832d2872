//! Loop boundary clamping and snapshot save/restore

use crate::core::{CodecData, CodingType, MetaType, Snapshot, VgmStream};
use log::{trace, warn};

/// Where a session stands relative to its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Loop flag is off
    NotLooped,
    /// Loop start has not been reached since the last rewind
    BeforeLoopStart,
    /// Loop start snapshot is held; loop end jumps back to it
    InLoop,
}

impl VgmStream {
    /// Current loop state
    pub fn loop_state(&self) -> LoopState {
        if !self.loop_flag {
            LoopState::NotLooped
        } else if self.loop_snapshot.is_some() {
            LoopState::InLoop
        } else {
            LoopState::BeforeLoopStart
        }
    }
}

/// Samples that can be decoded before hitting a block end, a loop boundary
/// or a codec frame boundary.
pub fn samples_to_do(samples_this_block: usize, samples_per_frame: usize, vgm: &VgmStream) -> usize {
    let pos = &vgm.pos;
    let samples_left_this_block = samples_this_block.saturating_sub(pos.samples_into_block);
    let mut samples_to_do = samples_left_this_block;

    if vgm.loop_flag {
        let step_end = pos.current_sample + samples_left_this_block;
        if step_end > vgm.loop_end_sample {
            samples_to_do = vgm.loop_end_sample.saturating_sub(pos.current_sample);
        }
        if vgm.loop_snapshot.is_none() && step_end > vgm.loop_start_sample {
            samples_to_do = vgm.loop_start_sample.saturating_sub(pos.current_sample);
        }
    }

    if samples_per_frame > 1 {
        let into_frame = pos.samples_into_block % samples_per_frame;
        if into_frame + samples_to_do > samples_per_frame {
            samples_to_do = samples_per_frame - into_frame;
        }
    }

    samples_to_do
}

/// Codecs whose live history must survive the jump back to loop start
fn keeps_loop_history(vgm: &VgmStream) -> bool {
    vgm.meta_type == MetaType::DspStd
        || matches!(vgm.coding_type, CodingType::Psx | CodingType::PsxBadflags)
}

/// Act on a loop boundary the session has just landed on.
///
/// Returns true when the session jumped back to loop start; callers
/// re-derive any layout geometry that depends on the restored position.
pub fn do_loop(vgm: &mut VgmStream) -> bool {
    if vgm.pos.current_sample == vgm.loop_end_sample {
        let Some(mut snapshot) = vgm.loop_snapshot.take() else {
            // Loop end reached without a loop start snapshot (loop_start == loop_end)
            warn!(
                "Loop end {} reached before loop start was recorded",
                vgm.loop_end_sample
            );
            vgm.loop_flag = false;
            return false;
        };

        if keeps_loop_history(vgm) {
            for (saved, live) in snapshot.channels.iter_mut().zip(&vgm.ch) {
                saved.adpcm_history1_16 = live.adpcm_history1_16;
                saved.adpcm_history2_16 = live.adpcm_history2_16;
                saved.adpcm_history1_32 = live.adpcm_history1_32;
                saved.adpcm_history2_32 = live.adpcm_history2_32;
            }
        }

        if let CodecData::Vorbis(data) = &mut vgm.codec_data {
            if let Err(e) = data.seek(vgm.loop_start_sample) {
                warn!("Seek to loop start {} failed: {}", vgm.loop_start_sample, e);
            }
        }

        trace!(
            "Loop end {} -> {}",
            vgm.loop_end_sample,
            snapshot.position.current_sample
        );
        vgm.ch.clone_from(&snapshot.channels);
        vgm.pos = snapshot.position;
        vgm.loop_snapshot = Some(snapshot);
        return true;
    }

    if vgm.loop_snapshot.is_none() && vgm.pos.current_sample == vgm.loop_start_sample {
        vgm.loop_snapshot = Some(Snapshot {
            channels: vgm.ch.clone(),
            position: vgm.pos,
        });
    }

    false
}
