mod common;

use common::{dsp_file, genh_file, halpst_file, render_all, wav_file, TrackedStreamFile};
use std::sync::atomic::Ordering;
use vgmstream_rs::encoder::{Encoder, WavEncoder};
use vgmstream_rs::layout::segmented::SegmentedBuilder;
use vgmstream_rs::meta;
use vgmstream_rs::{AudioFrame, LayoutType, LoopState, MemoryStreamFile, MetaType, VgmStream};

fn ramp(channels: usize, frames: usize) -> Vec<i16> {
    (0..frames * channels)
        .map(|i| ((i / channels) as i16).wrapping_mul(if i % channels == 0 { 7 } else { -5 }))
        .collect()
}

#[test]
fn test_flat_pcm_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let samples = ramp(2, 1000);
    std::fs::write(&input, wav_file(2, 44100, &samples)).unwrap();

    let mut vgm = VgmStream::open(&input).unwrap();
    assert_eq!(vgm.meta_type, MetaType::RiffWave);
    assert_eq!((vgm.channels(), vgm.sample_rate, vgm.num_samples), (2, 44100, 1000));

    let out = render_all(&mut vgm, 2000, 300);
    assert_eq!(out, samples);

    let output = dir.path().join("out.wav");
    let mut encoder = WavEncoder::new(&output, 44100, 2).unwrap();
    encoder.encode(&AudioFrame::new(out, 44100, 2, 0).unwrap()).unwrap();
    encoder.finalize().unwrap();

    let mut reader = hound::WavReader::open(&output).unwrap();
    let written: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(written, samples);
}

#[test]
fn test_loop_output_repeats_exactly() {
    // History-free DSP so every pass over the loop decodes identically
    let data = dsp_file(10, 32000, 0, Some((30, 100)), 3);
    let sf = MemoryStreamFile::new("loop.dsp", data).into_ref();
    let mut vgm = meta::detect(&sf).unwrap();
    assert_eq!(vgm.loop_state(), LoopState::BeforeLoopStart);

    let out = render_all(&mut vgm, 400, 17);
    assert_eq!(out.len(), 400);
    assert_eq!(vgm.loop_state(), LoopState::InLoop);
    for (i, &sample) in out.iter().enumerate().skip(100) {
        let folded = 30 + (i - 100) % 70;
        assert_eq!(sample, out[folded], "sample {}", i);
    }
}

#[test]
fn test_blocked_loop_restores_history() {
    // Three 98-sample blocks, looping 50..250 across block boundaries
    let sf = MemoryStreamFile::new("bgm.hps", halpst_file(&[7, 7, 7], 32000)).into_ref();
    let mut vgm = meta::detect(&sf).unwrap();
    assert_eq!(vgm.layout_type, LayoutType::Blocked(vgmstream_rs::core::BlockedLayout::Halpst));
    assert_eq!(vgm.num_samples, 294);
    assert!(!vgm.loop_flag);

    let straight = render_all(&mut vgm, 294, 294);
    vgm.reset();
    vgm.loop_flag = true;
    vgm.loop_start_sample = 50;
    vgm.loop_end_sample = 250;

    let looped = render_all(&mut vgm, 650, 64);
    assert_eq!(looped[..500], straight[..500]);
    // Each pass restarts at sample 50 with the history it had there
    for pass in 0..2 {
        let start = (250 + pass * 200) * 2;
        assert_eq!(looped[start..start + 200], straight[100..300], "pass {}", pass);
    }
}

#[test]
fn test_reads_stay_inside_stream_data() {
    let mut data = dsp_file(6, 32000, 2048, None, 5);
    let data_end = data.len() as u64;
    data.extend_from_slice(&[0xffu8; 64]);

    let inner = MemoryStreamFile::new("pad.dsp", data).into_ref();
    let (sf, max_read_end, _) = TrackedStreamFile::wrap(inner);
    let mut vgm = meta::detect(&sf).unwrap();

    let mut buf = [0i16; 5];
    loop {
        let done = vgm.render(&mut buf).unwrap();
        if done == 0 {
            break;
        }
        let pos = vgm.position();
        assert!(pos.current_sample <= vgm.num_samples);
        assert!(pos.samples_into_block <= vgm.num_samples);
    }
    assert_eq!(vgm.position().current_sample, 84);
    assert!(max_read_end.load(Ordering::SeqCst) <= data_end);
}

#[test]
fn test_reset_is_idempotent() {
    let sf = MemoryStreamFile::new("sfx.dsp", dsp_file(8, 32000, 2048, Some((20, 100)), 7)).into_ref();
    let mut vgm = meta::detect(&sf).unwrap();

    let first = render_all(&mut vgm, 250, 33);
    vgm.reset();
    vgm.reset();
    assert_eq!(vgm.loop_state(), LoopState::BeforeLoopStart);
    assert_eq!(vgm.position().current_sample, 0);
    let second = render_all(&mut vgm, 250, 250);
    assert_eq!(first, second);
}

#[test]
fn test_close_releases_shared_source_once() {
    let data = genh_file(2, 3, 4, 22050, 4, &[0u8; 16]);
    let inner = MemoryStreamFile::new("shared.genh", data).into_ref();
    let (sf, _, drops) = TrackedStreamFile::wrap(inner);

    let vgm = meta::detect(&sf).unwrap();
    assert_eq!(vgm.channels(), 2);
    drop(sf);
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    vgm.close();
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_segments_play_back_to_back() {
    let parts = [ramp(1, 40), ramp(1, 25), ramp(1, 60)];
    let mut builder = SegmentedBuilder::new();
    for (i, part) in parts.iter().enumerate() {
        let data: Vec<u8> = part.iter().flat_map(|s| s.to_be_bytes()).collect();
        let file = genh_file(1, 3, 0, 22050, part.len() as u32, &data);
        let sf = MemoryStreamFile::new(format!("part{}.genh", i), file).into_ref();
        builder = builder.segment(meta::detect(&sf).unwrap());
    }
    let mut vgm = builder.build().unwrap();
    assert_eq!(vgm.num_samples, 125);

    let out = render_all(&mut vgm, 500, 16);
    assert_eq!(out, parts.concat());
}

#[test]
fn test_txtp_playlist_loops_body() {
    let dir = tempfile::tempdir().unwrap();
    let intro: Vec<i16> = (0..30).collect();
    let body: Vec<i16> = (100..150).collect();
    for (name, samples) in [("intro.genh", &intro), ("body.genh", &body)] {
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes()).collect();
        std::fs::write(dir.path().join(name), genh_file(1, 3, 0, 48000, samples.len() as u32, &data)).unwrap();
    }
    std::fs::write(dir.path().join("song.txtp"), "intro.genh\nbody.genh\nloop_start_segment = 2\n").unwrap();

    let mut vgm = VgmStream::open(dir.path().join("song.txtp")).unwrap();
    assert_eq!(vgm.meta_type, MetaType::Txtp);
    assert_eq!((vgm.loop_start_sample, vgm.loop_end_sample), (30, 80));
    assert_eq!(vgm.play_samples(2.0, 0.0, 0.0), 130);

    let out = render_all(&mut vgm, 130, 21);
    let expected: Vec<i16> = intro.iter().chain(&body).chain(&body).copied().collect();
    assert_eq!(out, expected);
}
