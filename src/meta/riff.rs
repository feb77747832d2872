//! RIFF WAVE with PCM data, optionally looped through a `smpl` chunk

use super::{not_format, open_channels, require_extension};
use crate::core::{CodingType, MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::streamfile::{StreamFileExt, StreamFileRef};

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xfffe;

/// What the `fmt ` chunk says
struct Format {
    channels: usize,
    sample_rate: u32,
    coding_type: CodingType,
    bytes_per_sample: usize,
}

fn read_format(sf: &StreamFileRef, chunk: u64) -> VgmResult<Format> {
    let format_tag = sf.read_u16_le(chunk + 8)?;
    if format_tag != WAVE_FORMAT_PCM && format_tag != WAVE_FORMAT_EXTENSIBLE {
        return Err(VgmError::InvalidMetadata(format!(
            "WAVE format {:#x} is not PCM",
            format_tag
        )));
    }

    let (coding_type, bytes_per_sample) = match sf.read_u16_le(chunk + 0x16)? {
        8 => (CodingType::Pcm8UInt, 1),
        16 => (CodingType::Pcm16LeInt, 2),
        bits => {
            return Err(VgmError::InvalidMetadata(format!(
                "{}-bit WAVE is not supported",
                bits
            )));
        }
    };

    Ok(Format {
        channels: sf.read_u16_le(chunk + 0xa)? as usize,
        sample_rate: sf.read_u32_le(chunk + 0xc)?,
        coding_type,
        bytes_per_sample,
    })
}

/// Forward loop of the `smpl` chunk, as (start, end exclusive)
fn read_sample_loop(sf: &StreamFileRef, chunk: u64) -> VgmResult<Option<(usize, usize)>> {
    if sf.read_u32_le(chunk + 0x24)? != 1 || sf.read_u32_le(chunk + 0x2c + 4)? != 0 {
        return Ok(None);
    }
    let start = sf.read_u32_le(chunk + 0x2c + 8)? as usize;
    let end = sf.read_u32_le(chunk + 0x2c + 0xc)? as usize + 1;
    Ok(Some((start, end)))
}

/// Parse a RIFF WAVE file, walking its chunks for format, data and loop
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    require_extension(sf, &["wav", "lwav"])?;
    if !sf.check_id(0, b"RIFF") || !sf.check_id(8, b"WAVE") {
        return Err(not_format("RIFF WAVE"));
    }

    let riff_end = sf.read_u32_le(4)? as u64 + 8;
    let file_size = sf.size();
    if file_size < riff_end {
        return Err(VgmError::InvalidMetadata("Truncated RIFF".to_string()));
    }

    let mut format = None;
    let mut data = None;
    let mut sample_loop = None;

    let mut chunk = 0xc;
    while chunk + 8 <= riff_end {
        let mut id = [0u8; 4];
        sf.read_exact_at(chunk, &mut id)?;
        let size = sf.read_u32_le(chunk + 4)? as u64;
        if chunk + 8 + size > file_size {
            return Err(VgmError::InvalidMetadata(format!(
                "Chunk {:?} runs past the end of the file",
                String::from_utf8_lossy(&id)
            )));
        }

        match &id {
            b"fmt " => {
                if format.is_some() {
                    return Err(VgmError::InvalidMetadata("Two fmt chunks".to_string()));
                }
                format = Some(read_format(sf, chunk)?);
            }
            b"data" => {
                if data.is_some() {
                    return Err(VgmError::InvalidMetadata("Two data chunks".to_string()));
                }
                data = Some((chunk + 8, size as usize));
            }
            b"smpl" => sample_loop = read_sample_loop(sf, chunk)?,
            _ => {}
        }

        // Chunks are word aligned
        chunk += 8 + size + (size & 1);
    }

    let (Some(format), Some((start_offset, data_size))) = (format, data) else {
        return Err(VgmError::InvalidMetadata("RIFF without fmt or data".to_string()));
    };
    if format.channels == 0 {
        return Err(VgmError::InvalidChannels {
            expected: 1,
            got: 0,
        });
    }

    let mut vgm = VgmStream::allocate(format.channels, sample_loop.is_some())?;
    vgm.coding_type = format.coding_type;
    vgm.sample_rate = format.sample_rate;
    vgm.num_samples = data_size / (format.channels * format.bytes_per_sample);
    match sample_loop {
        Some((start, end)) => {
            vgm.meta_type = MetaType::RiffWaveSmpl;
            vgm.loop_start_sample = start;
            vgm.loop_end_sample = end;
        }
        None => vgm.meta_type = MetaType::RiffWave,
    }

    open_channels(&mut vgm, sf, start_offset, format.bytes_per_sample as u64);
    Ok(vgm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfile::MemoryStreamFile;
    use std::io::Cursor;

    fn wav(bits: u16, frames: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames as i32 {
            if bits == 8 {
                writer.write_sample(i as i8).unwrap();
                writer.write_sample(-(i as i8)).unwrap();
            } else {
                writer.write_sample(i as i16 * 100).unwrap();
                writer.write_sample(-(i as i16) * 100).unwrap();
            }
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_pcm16_wave() {
        let sf = MemoryStreamFile::new("a.wav", wav(16, 10)).into_ref();
        let mut vgm = init(&sf).unwrap();
        vgm.capture_start();
        assert_eq!(vgm.meta_type, MetaType::RiffWave);
        assert_eq!(vgm.num_samples, 10);

        let mut buf = [0i16; 4];
        vgm.render(&mut buf).unwrap();
        assert_eq!(buf, [0, 0, 100, -100]);
    }

    #[test]
    fn test_pcm8_wave() {
        let sf = MemoryStreamFile::new("a.wav", wav(8, 4)).into_ref();
        let mut vgm = init(&sf).unwrap();
        vgm.capture_start();
        assert_eq!(vgm.coding_type, CodingType::Pcm8UInt);

        let mut buf = [0i16; 4];
        vgm.render(&mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0x100, -0x100]);
    }
}
