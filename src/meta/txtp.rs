//! TXTP: a text playlist of segment files played back to back
//!
//! ```text
//! # intro, then loop the body forever
//! intro.dsp
//! body.dsp
//! loop_start_segment = 2
//! ```

use super::{detect_internal, require_extension};
use crate::core::{MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::layout::segmented::SegmentedBuilder;
use crate::streamfile::{DEFAULT_BUFFER_SIZE, StreamFileExt, StreamFileRef, has_extension};
use log::debug;

/// Largest playlist accepted
const MAX_PLAYLIST_SIZE: u64 = 0x10000;

/// Parsed playlist, loop segments 1-based as written
#[derive(Debug, Default, PartialEq)]
struct Playlist {
    segments: Vec<String>,
    loop_start_segment: Option<usize>,
    loop_end_segment: Option<usize>,
    carry_history: bool,
}

fn parse_index(key: &str, value: &str) -> VgmResult<usize> {
    value
        .parse()
        .map_err(|_| VgmError::InvalidMetadata(format!("Bad value for {}: {:?}", key, value)))
}

fn parse_playlist(text: &str) -> VgmResult<Playlist> {
    let mut playlist = Playlist::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            playlist.segments.push(line.to_string());
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            "loop_start_segment" => playlist.loop_start_segment = Some(parse_index(key, value)?),
            "loop_end_segment" => playlist.loop_end_segment = Some(parse_index(key, value)?),
            "carry_history" => playlist.carry_history = matches!(value, "1" | "true"),
            _ => debug!("Ignoring playlist command {:?}", key),
        }
    }

    if playlist.segments.is_empty() {
        return Err(VgmError::InvalidMetadata("Playlist without segments".to_string()));
    }
    Ok(playlist)
}

/// 0-based inclusive loop segment range
fn loop_range(playlist: &Playlist) -> VgmResult<Option<(usize, usize)>> {
    let Some(start) = playlist.loop_start_segment else {
        return Ok(None);
    };
    let end = playlist.loop_end_segment.unwrap_or(playlist.segments.len());
    if start == 0 || end == 0 {
        return Err(VgmError::InvalidMetadata(
            "Loop segments are numbered from 1".to_string(),
        ));
    }
    Ok(Some((start - 1, end - 1)))
}

/// Open every segment listed in a `.txtp` file and build a segmented session
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    require_extension(sf, &["txtp"])?;
    let size = sf.size();
    if size > MAX_PLAYLIST_SIZE {
        return Err(VgmError::InvalidMetadata(format!("Playlist of {} bytes", size)));
    }

    let mut raw = vec![0u8; size as usize];
    sf.read_exact_at(0, &mut raw)?;
    let playlist = parse_playlist(&String::from_utf8_lossy(&raw))?;

    let mut builder = SegmentedBuilder::new()
        .meta_type(MetaType::Txtp)
        .carry_history(playlist.carry_history);
    for name in &playlist.segments {
        if has_extension(name, "txtp") {
            return Err(VgmError::InvalidMetadata(format!(
                "Nested playlist {} is not supported",
                name
            )));
        }
        let segment_sf = sf.open(name, DEFAULT_BUFFER_SIZE)?;
        let segment = detect_internal(&segment_sf, false)
            .ok_or_else(|| VgmError::UnsupportedFormat(name.clone()))?;
        builder = builder.segment(segment);
    }
    if let Some((start, end)) = loop_range(&playlist)? {
        builder = builder.loop_segments(start, end);
    }

    builder.build()
}
