//! Format detection: the ordered recognizer registry and the dispatcher

pub mod adx;
pub mod ast;
pub mod dsp;
mod dual_file;
pub mod genh;
pub mod halpst;
pub mod ogg_vorbis;
pub mod raw;
pub mod riff;
pub mod rstm;
pub mod txtp;
pub mod vag;

use crate::core::{MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::streamfile::{StdioStreamFile, StreamFileRef, has_extension};
use log::{debug, trace, warn};
use std::path::Path;
use std::sync::Arc;

/// Lowest sample rate a detected stream may declare
pub const MIN_SAMPLE_RATE: u32 = 1000;
/// Highest sample rate a detected stream may declare
pub const MAX_SAMPLE_RATE: u32 = 96000;

/// Formats that sometimes ship as two mono files, one per channel
const DUAL_FILE_FORMATS: &[MetaType] = &[MetaType::DspStd, MetaType::Ps2VagP, MetaType::Genh];

/// Header parser: builds a session or reports why the source is not its format
pub type InitFn = fn(&StreamFileRef) -> VgmResult<VgmStream>;

/// One entry of the registry
#[derive(Debug, Clone, Copy)]
pub struct Recognizer {
    /// Short name used in logs
    pub name: &'static str,
    /// Header parser
    pub init: InitFn,
}

/// Recognizers in the order they are tried.
///
/// The first to accept wins, so formats with a magic number come before the
/// ones matched by extension alone, and HALPST comes before the standard DSP
/// header it can be mistaken for.
pub static RECOGNIZERS: &[Recognizer] = &[
    Recognizer { name: "adx", init: adx::init },
    Recognizer { name: "rstm", init: rstm::init },
    Recognizer { name: "ast", init: ast::init },
    Recognizer { name: "halpst", init: halpst::init },
    Recognizer { name: "dsp_std", init: dsp::init },
    Recognizer { name: "ps2_vag", init: vag::init },
    Recognizer { name: "riff", init: riff::init },
    Recognizer { name: "ogg_vorbis", init: ogg_vorbis::init },
    Recognizer { name: "genh", init: genh::init },
    Recognizer { name: "txtp", init: txtp::init },
    Recognizer { name: "raw", init: raw::init },
];

/// Identify the format of `sf` and build a ready-to-render session.
///
/// Returns `None` when no recognizer accepts the source.
pub fn detect(sf: &StreamFileRef) -> Option<VgmStream> {
    detect_internal(sf, true)
}

pub(crate) fn detect_internal(sf: &StreamFileRef, try_dual_file: bool) -> Option<VgmStream> {
    for recognizer in RECOGNIZERS {
        let mut vgm = match (recognizer.init)(sf) {
            Ok(vgm) => vgm,
            Err(e) => {
                trace!("{}: not {} ({})", sf.name(), recognizer.name, e);
                continue;
            }
        };

        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&vgm.sample_rate) {
            warn!(
                "{}: {} header has implausible sample rate {}, skipping",
                sf.name(),
                recognizer.name,
                vgm.sample_rate
            );
            continue;
        }

        sanitize_loop(&mut vgm, sf.name());

        if try_dual_file && vgm.channels() == 1 && DUAL_FILE_FORMATS.contains(&vgm.meta_type) {
            dual_file::try_dual_file_stereo(&mut vgm, sf);
        }

        vgm.capture_start();
        debug!(
            "{}: {} ({} channels, {} Hz)",
            sf.name(),
            vgm.meta_type.description(),
            vgm.channels(),
            vgm.sample_rate
        );
        return Some(vgm);
    }
    None
}

/// Drop loop points that cannot be played
fn sanitize_loop(vgm: &mut VgmStream, name: &str) {
    if !vgm.loop_flag {
        return;
    }
    if vgm.loop_start_sample >= vgm.loop_end_sample || vgm.loop_end_sample > vgm.num_samples {
        warn!(
            "{}: loop {}..{} does not fit {} samples, playing without loop",
            name, vgm.loop_start_sample, vgm.loop_end_sample, vgm.num_samples
        );
        vgm.disable_loop();
    }
}

/// Error for a source that is not the format a recognizer handles
pub(crate) fn not_format(what: &str) -> VgmError {
    VgmError::UnsupportedFormat(format!("not {}", what))
}

/// Reject unless `sf` carries one of `extensions`
pub(crate) fn require_extension(sf: &StreamFileRef, extensions: &[&str]) -> VgmResult<()> {
    if extensions.iter().any(|ext| has_extension(sf.name(), ext)) {
        Ok(())
    } else {
        Err(VgmError::UnsupportedFormat(format!(
            "extension of {} is not one of {:?}",
            sf.name(),
            extensions
        )))
    }
}

/// Point every channel of `vgm` at `sf`, channel `i` starting at `start + i * step`
pub(crate) fn open_channels(vgm: &mut VgmStream, sf: &StreamFileRef, start: u64, step: u64) {
    for (i, ch) in vgm.ch.iter_mut().enumerate() {
        ch.streamfile = Some(Arc::clone(sf));
        ch.channel_start_offset = start + step * i as u64;
        ch.offset = ch.channel_start_offset;
    }
}

impl VgmStream {
    /// Open a file from disk and detect its format
    pub fn open<P: AsRef<Path>>(path: P) -> VgmResult<Self> {
        let sf: StreamFileRef = Arc::new(StdioStreamFile::open_path(path)?);
        Self::from_streamfile(&sf)
    }

    /// Detect the format of an already-open byte source
    pub fn from_streamfile(sf: &StreamFileRef) -> VgmResult<Self> {
        detect(sf).ok_or_else(|| VgmError::UnsupportedFormat(sf.name().to_string()))
    }
}
