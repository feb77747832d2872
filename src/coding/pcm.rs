//! 8- and 16-bit PCM decode steps

use crate::core::{Sample, VgmStreamChannel};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Read `count` sample units of `width` bytes placed every `stride` bytes,
/// starting at unit `first`. Returns the bytes actually available.
fn read_units(
    stream: &VgmStreamChannel,
    first: usize,
    count: usize,
    width: usize,
    stride: usize,
) -> (Vec<u8>, usize) {
    if count == 0 {
        return (Vec::new(), 0);
    }
    let span = (count - 1) * stride + width;
    let mut bytes = vec![0u8; span];
    let start = stream.offset + (first * stride) as u64;

    let read = match &stream.streamfile {
        Some(sf) => sf.read_at(start, &mut bytes),
        None => 0,
    };
    let available = if read < width {
        0
    } else {
        ((read - width) / stride + 1).min(count)
    };
    (bytes, available)
}

fn decode_16bit(
    stream: &VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
    stride: usize,
    read: fn(&[u8]) -> i16,
) -> usize {
    let (bytes, available) = read_units(stream, first_sample, samples_to_do, 2, stride);
    for i in 0..available {
        outbuf[i * channel_spacing] = read(&bytes[i * stride..]);
    }
    available
}

/// Little-endian 16-bit PCM
pub fn decode_pcm16le(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    decode_16bit(
        stream,
        outbuf,
        channel_spacing,
        first_sample,
        samples_to_do,
        2,
        LittleEndian::read_i16,
    )
}

/// Big-endian 16-bit PCM
pub fn decode_pcm16be(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    decode_16bit(
        stream,
        outbuf,
        channel_spacing,
        first_sample,
        samples_to_do,
        2,
        BigEndian::read_i16,
    )
}

/// Little-endian 16-bit PCM with channels interleaved every sample
pub fn decode_pcm16le_int(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    decode_16bit(
        stream,
        outbuf,
        channel_spacing,
        first_sample,
        samples_to_do,
        2 * channel_spacing,
        LittleEndian::read_i16,
    )
}

/// Signed 8-bit PCM
pub fn decode_pcm8(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    let (bytes, available) = read_units(stream, first_sample, samples_to_do, 1, 1);
    for i in 0..available {
        outbuf[i * channel_spacing] = (bytes[i] as i8 as Sample) * 0x100;
    }
    available
}

/// Unsigned 8-bit PCM with channels interleaved every sample
pub fn decode_pcm8_unsigned_int(
    stream: &mut VgmStreamChannel,
    outbuf: &mut [Sample],
    channel_spacing: usize,
    first_sample: usize,
    samples_to_do: usize,
) -> usize {
    let (bytes, available) =
        read_units(stream, first_sample, samples_to_do, 1, channel_spacing);
    for i in 0..available {
        outbuf[i * channel_spacing] = ((bytes[i * channel_spacing] ^ 0x80) as i8 as Sample) * 0x100;
    }
    available
}
