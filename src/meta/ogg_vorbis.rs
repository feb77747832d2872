//! Ogg Vorbis, looped through comment tags

use super::{not_format, require_extension};
use crate::coding::vorbis::{VorbisCodecData, VorbisInfo};
use crate::core::{CodecData, CodingType, MetaType, VgmStream};
use crate::error::VgmResult;
use crate::streamfile::{StreamFileExt, StreamFileRef};
use log::debug;
use std::sync::Arc;

fn numeric_tag(info: &VorbisInfo, keys: &[&str]) -> Option<usize> {
    keys.iter()
        .find_map(|key| info.tag(key))
        .and_then(|value| value.trim().parse().ok())
}

/// Loop points from `LOOPSTART` plus either `LOOPLENGTH` or `LOOPEND`;
/// without an end the loop runs to the end of the stream. A length that
/// overflows drops the loop.
fn loop_points(info: &VorbisInfo, num_samples: usize) -> Option<(usize, usize)> {
    let start = numeric_tag(info, &["LOOPSTART", "LOOP_START"])?;
    let end = match numeric_tag(info, &["LOOPLENGTH"]) {
        Some(length) => start.checked_add(length)?,
        None => numeric_tag(info, &["LOOPEND", "LOOP_END"]).unwrap_or(num_samples),
    };
    Some((start, end.min(num_samples)))
}

/// Open an Ogg Vorbis stream through the external decoder
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    require_extension(sf, &["ogg", "logg"])?;
    if !sf.check_id(0, b"OggS") {
        return Err(not_format("Ogg"));
    }

    let (data, info) = VorbisCodecData::open(Arc::clone(sf))?;
    let num_samples = info.n_frames as usize;
    let loop_points = loop_points(&info, num_samples);
    if let Some((start, end)) = loop_points {
        debug!("{}: loop tags {}..{}", sf.name(), start, end);
    }

    let mut vgm = VgmStream::allocate(info.channels, loop_points.is_some())?;
    vgm.meta_type = MetaType::OggVorbis;
    vgm.coding_type = CodingType::OggVorbis;
    vgm.sample_rate = info.sample_rate;
    vgm.num_samples = num_samples;
    if let Some((start, end)) = loop_points {
        vgm.loop_start_sample = start;
        vgm.loop_end_sample = end;
    }
    vgm.codec_data = CodecData::Vorbis(Box::new(data));

    Ok(vgm)
}
