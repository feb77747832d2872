//! Codec dispatch and per-codec decode steps

pub mod adx;
pub mod ima;
pub mod ngc_afc;
pub mod ngc_dsp;
pub mod pcm;
pub mod psx;
pub mod vorbis;

use crate::core::{CodecData, CodingType, LayoutType, Sample, VgmStream, VgmStreamChannel};
use crate::error::{VgmError, VgmResult};

/// How a decode request is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchShape {
    /// One decode step per channel, written at the interleaved stride
    PerChannel,
    /// One call for the whole session
    WholeSession,
    /// The layout's active child session renders the samples
    LayoutOwned,
}

impl DispatchShape {
    /// Shape used for a session
    pub fn of(vgm: &VgmStream) -> Self {
        if vgm.layout_type == LayoutType::Segmented {
            return DispatchShape::LayoutOwned;
        }
        match vgm.coding_type {
            CodingType::OggVorbis => DispatchShape::WholeSession,
            _ => DispatchShape::PerChannel,
        }
    }
}

/// Per-channel decode step: `(channel, output, channel spacing, first sample in block, count) -> samples produced`
pub type ChannelDecoder = fn(&mut VgmStreamChannel, &mut [Sample], usize, usize, usize) -> usize;

fn channel_decoder(coding: CodingType) -> Option<ChannelDecoder> {
    let decoder: ChannelDecoder = match coding {
        CodingType::Pcm16Le => pcm::decode_pcm16le,
        CodingType::Pcm16Be => pcm::decode_pcm16be,
        CodingType::Pcm16LeInt => pcm::decode_pcm16le_int,
        CodingType::Pcm8 => pcm::decode_pcm8,
        CodingType::Pcm8UInt => pcm::decode_pcm8_unsigned_int,
        CodingType::NgcDsp => ngc_dsp::decode_ngc_dsp,
        CodingType::NgcAfc => ngc_afc::decode_ngc_afc,
        CodingType::Psx => psx::decode_psx,
        CodingType::PsxBadflags => psx::decode_psx_badflags,
        CodingType::CriAdx => adx::decode_adx,
        CodingType::Ima => ima::decode_ima,
        CodingType::DviIma => ima::decode_dvi_ima,
        CodingType::OggVorbis => return None,
    };
    Some(decoder)
}

/// Decode `samples_to_do` samples per channel into `buffer`, starting at
/// frame `samples_written`.
///
/// Returns how many samples every channel produced; a short count means the
/// byte source ran out.
pub fn decode(
    vgm: &mut VgmStream,
    samples_written: usize,
    samples_to_do: usize,
    buffer: &mut [Sample],
) -> VgmResult<usize> {
    let channels = vgm.channels();

    match DispatchShape::of(vgm) {
        DispatchShape::LayoutOwned => {
            crate::layout::segmented::decode_segment(vgm, samples_written, samples_to_do, buffer)
        }
        DispatchShape::WholeSession => match &mut vgm.codec_data {
            CodecData::Vorbis(data) => {
                let start = samples_written * channels;
                let end = start + samples_to_do * channels;
                data.decode(&mut buffer[start..end], channels)
            }
            _ => Err(VgmError::DecodeError(
                "Vorbis session has no decoder state".to_string(),
            )),
        },
        DispatchShape::PerChannel => {
            let decoder = channel_decoder(vgm.coding_type).ok_or_else(|| {
                VgmError::DecodeError(format!(
                    "{} cannot be decoded per channel",
                    vgm.coding_type.description()
                ))
            })?;
            let first_sample = vgm.pos.samples_into_block;

            let mut produced = samples_to_do;
            for (chan, stream) in vgm.ch.iter_mut().enumerate() {
                let out = &mut buffer[samples_written * channels + chan..];
                let done = decoder(stream, out, channels, first_sample, samples_to_do);
                produced = produced.min(done);
            }
            Ok(produced)
        }
    }
}

/// Read one frame of `buf.len()` bytes from a channel, false on a short read
pub(crate) fn read_frame(stream: &VgmStreamChannel, offset: u64, buf: &mut [u8]) -> bool {
    match &stream.streamfile {
        Some(sf) => sf.read_at(offset, buf) == buf.len(),
        None => false,
    }
}

/// Saturate to the 16-bit sample range
#[inline]
pub(crate) fn clamp16(value: i32) -> Sample {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as Sample
}

/// Sign-extended high nibble
#[inline]
pub(crate) fn high_nibble_signed(byte: u8) -> i32 {
    ((byte as i8) >> 4) as i32
}

/// Sign-extended low nibble
#[inline]
pub(crate) fn low_nibble_signed(byte: u8) -> i32 {
    (((byte << 4) as i8) >> 4) as i32
}
