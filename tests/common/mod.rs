//! Fixture builders and instrumented byte sources shared by the scenario tests

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use vgmstream_rs::coding::ngc_dsp::dsp_samples_to_nibbles;
use vgmstream_rs::error::VgmResult;
use vgmstream_rs::{StreamFile, StreamFileRef, VgmStream};

/// DSP data byte `j` (1..8) of frame `f`; frame headers are 0 (predictor 0, scale 1)
fn nibble_byte(frame: usize, j: usize, seed: u8) -> u8 {
    (frame * 31 + j * 17) as u8 ^ seed
}

/// `frames` DSP ADPCM frames of pseudo-random nibbles
pub fn dsp_frames(frames: usize, seed: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(frames * 8);
    for f in 0..frames {
        data.push(0);
        for j in 1..8 {
            data.push(nibble_byte(f, j, seed));
        }
    }
    data
}

/// Standard mono `.dsp` file.
///
/// `coef1` weights the previous sample; 0 makes every sample independent of
/// history. `looped` is a (start, end) sample range.
pub fn dsp_file(
    frames: usize,
    sample_rate: u32,
    coef1: i16,
    looped: Option<(usize, usize)>,
    seed: u8,
) -> Vec<u8> {
    let samples = frames * 14;
    let mut data = vec![0u8; 0x60];
    data[0..4].copy_from_slice(&(samples as u32).to_be_bytes());
    data[4..8].copy_from_slice(&((frames * 16) as u32).to_be_bytes());
    data[8..0xc].copy_from_slice(&sample_rate.to_be_bytes());
    if let Some((start, end)) = looped {
        data[0xc..0xe].copy_from_slice(&1u16.to_be_bytes());
        data[0x10..0x14].copy_from_slice(&(dsp_samples_to_nibbles(start) as u32).to_be_bytes());
        data[0x14..0x18].copy_from_slice(&(dsp_samples_to_nibbles(end - 1) as u32).to_be_bytes());
    }
    data[0x1c..0x1e].copy_from_slice(&coef1.to_be_bytes());
    data.extend_from_slice(&dsp_frames(frames, seed));
    data
}

/// GENH file with `data` following a 0x40-byte header
pub fn genh_file(
    channels: u32,
    coding: u32,
    interleave: u32,
    sample_rate: u32,
    num_samples: u32,
    data: &[u8],
) -> Vec<u8> {
    let mut file = vec![0u8; 0x40];
    file[0..4].copy_from_slice(b"GENH");
    file[4..8].copy_from_slice(&channels.to_le_bytes());
    file[8..0xc].copy_from_slice(&interleave.to_le_bytes());
    file[0xc..0x10].copy_from_slice(&sample_rate.to_le_bytes());
    file[0x10..0x14].copy_from_slice(&(-1i32).to_le_bytes());
    file[0x14..0x18].copy_from_slice(&num_samples.to_le_bytes());
    file[0x18..0x1c].copy_from_slice(&coding.to_le_bytes());
    file[0x1c..0x20].copy_from_slice(&0x40u32.to_le_bytes());
    file[0x20..0x24].copy_from_slice(&0x40u32.to_le_bytes());
    file.extend_from_slice(data);
    file
}

/// Stereo HALPST file of DSP blocks holding `block_frames[i]` frames per
/// channel, chain ending with -1. Both channels predict from the previous sample.
pub fn halpst_file(block_frames: &[usize], sample_rate: u32) -> Vec<u8> {
    let total: usize = block_frames.iter().sum::<usize>() * 14;
    let nibbles = dsp_samples_to_nibbles(total - 1) as u32;

    let mut data = vec![0u8; 0x80];
    data[0..8].copy_from_slice(b" HALPST\0");
    data[8..0xc].copy_from_slice(&sample_rate.to_be_bytes());
    data[0xc..0x10].copy_from_slice(&2u32.to_be_bytes());
    for ch in 0..2 {
        let base = 0x10 + ch * 0x38;
        data[base + 0x8..base + 0xc].copy_from_slice(&nibbles.to_be_bytes());
        data[base + 0x10..base + 0x12].copy_from_slice(&2048i16.to_be_bytes());
    }

    let mut first_frame = 0;
    for (i, &frames) in block_frames.iter().enumerate() {
        let size = frames * 8;
        let offset = data.len();
        let next = if i + 1 == block_frames.len() {
            -1
        } else {
            (offset + 0x20 + size * 2) as i32
        };
        let mut header = vec![0u8; 0x20];
        header[0..4].copy_from_slice(&((size * 2) as u32).to_be_bytes());
        header[8..12].copy_from_slice(&next.to_be_bytes());
        data.extend_from_slice(&header);
        for seed in [0x11u8, 0x77] {
            let all = dsp_frames(first_frame + frames, seed);
            data.extend_from_slice(&all[first_frame * 8..]);
        }
        first_frame += frames;
    }
    data
}

/// 16-bit RIFF WAVE in memory
pub fn wav_file(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

/// Render `frames` frames in chunks of `chunk`, returning everything produced
pub fn render_all(vgm: &mut VgmStream, frames: usize, chunk: usize) -> Vec<i16> {
    let channels = vgm.channels();
    let mut out = Vec::with_capacity(frames * channels);
    let mut buf = vec![0i16; chunk * channels];
    while out.len() < frames * channels {
        let want = chunk.min(frames - out.len() / channels);
        let done = vgm.render(&mut buf[..want * channels]).unwrap();
        if done == 0 {
            break;
        }
        out.extend_from_slice(&buf[..done * channels]);
    }
    out
}

/// Byte source wrapper that records the furthest byte read and counts drops
#[derive(Debug)]
pub struct TrackedStreamFile {
    inner: StreamFileRef,
    /// One past the furthest byte returned by `read_at`
    pub max_read_end: Arc<AtomicU64>,
    /// Incremented once when the wrapper is dropped
    pub drops: Arc<AtomicUsize>,
}

impl TrackedStreamFile {
    pub fn wrap(inner: StreamFileRef) -> (StreamFileRef, Arc<AtomicU64>, Arc<AtomicUsize>) {
        let max_read_end = Arc::new(AtomicU64::new(0));
        let drops = Arc::new(AtomicUsize::new(0));
        let tracked = TrackedStreamFile {
            inner,
            max_read_end: Arc::clone(&max_read_end),
            drops: Arc::clone(&drops),
        };
        (Arc::new(tracked), max_read_end, drops)
    }
}

impl StreamFile for TrackedStreamFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let n = self.inner.read_at(offset, buf);
        if n > 0 {
            self.max_read_end.fetch_max(offset + n as u64, Ordering::SeqCst);
        }
        n
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn open(&self, name: &str, buffer_size: usize) -> VgmResult<StreamFileRef> {
        self.inner.open(name, buffer_size)
    }
}

impl Drop for TrackedStreamFile {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
