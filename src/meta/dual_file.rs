use super::detect_internal;
use crate::core::VgmStream;
use crate::streamfile::{DEFAULT_BUFFER_SIZE, StreamFileRef, base_name};
use log::{debug, trace};

/// Channel markers placed right before the extension, as (left, right)
const MARKER_PAIRS: [(&str, &str); 5] = [
    ("L", "R"),
    ("l", "r"),
    ("_0", "_1"),
    ("left", "right"),
    ("Left", "Right"),
];

/// Name of the file holding the other channel, plus the side (0 left, 1 right)
/// of the file we already have
fn sibling_name(name: &str) -> Option<(String, usize)> {
    let name = base_name(name);
    let (stem, ext) = match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    };

    for (left, right) in MARKER_PAIRS {
        for (side, marker, other) in [(0, left, right), (1, right, left)] {
            if let Some(prefix) = stem.strip_suffix(marker) {
                return Some((format!("{}{}{}", prefix, other, ext), side));
            }
        }
    }
    None
}

/// True when the two mono sessions differ in nothing but their data
fn same_shape(a: &VgmStream, b: &VgmStream) -> bool {
    b.channels() == 1
        && a.meta_type == b.meta_type
        && a.coding_type == b.coding_type
        && a.layout_type == b.layout_type
        && a.sample_rate == b.sample_rate
        && a.num_samples == b.num_samples
        && a.loop_flag == b.loop_flag
        && (!a.loop_flag
            || (a.loop_start_sample == b.loop_start_sample
                && a.loop_end_sample == b.loop_end_sample))
        && a.interleave_block_size == b.interleave_block_size
        && a.interleave_smallblock_size == b.interleave_smallblock_size
}

/// Turn a mono session into stereo when a matching file for the other channel
/// sits next to it. Leaves `opened` untouched on any mismatch.
pub(super) fn try_dual_file_stereo(opened: &mut VgmStream, sf: &StreamFileRef) {
    let Some((sibling, side)) = sibling_name(sf.name()) else {
        return;
    };

    let other_sf = match sf.open(&sibling, DEFAULT_BUFFER_SIZE) {
        Ok(other_sf) => other_sf,
        Err(e) => {
            trace!("{}: no channel pair ({})", sibling, e);
            return;
        }
    };
    let Some(other) = detect_internal(&other_sf, false) else {
        trace!("{}: channel pair not recognized", sibling);
        return;
    };
    if !same_shape(opened, &other) {
        debug!("{}: channel pair differs from {}, staying mono", sibling, sf.name());
        return;
    }

    let (Some(mine), Some(theirs)) = (opened.ch.first().cloned(), other.ch.first().cloned()) else {
        return;
    };
    opened.ch = if side == 0 {
        vec![mine, theirs]
    } else {
        vec![theirs, mine]
    };
    debug!("{}: merged with {} into stereo", sf.name(), sibling);
}
