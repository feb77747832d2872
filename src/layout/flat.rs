use super::decode_step;
use crate::core::{Sample, VgmStream};
use crate::error::VgmResult;
use crate::looping;

/// Render a stream that is one block from start to end
pub fn render(vgm: &mut VgmStream, buffer: &mut [Sample], sample_count: usize) -> VgmResult<usize> {
    let samples_per_frame = vgm.coding_type.samples_per_frame();
    let samples_this_block = vgm.num_samples;
    let mut samples_written = 0;

    while samples_written < sample_count {
        if vgm.loop_flag && looping::do_loop(vgm) {
            continue;
        }

        let samples_to_do = looping::samples_to_do(samples_this_block, samples_per_frame, vgm)
            .min(sample_count - samples_written);
        if samples_to_do == 0 {
            break;
        }

        let done = decode_step(vgm, samples_written, samples_to_do, buffer)?;
        samples_written += done;
        if done < samples_to_do {
            break;
        }
    }

    Ok(samples_written)
}

#[cfg(test)]
mod tests {
    use crate::core::{CodingType, VgmStream};
    use crate::streamfile::MemoryStreamFile;

    fn ramp_stream(samples: usize, looped: bool) -> VgmStream {
        let data: Vec<u8> = (0..samples as i16).flat_map(|s| s.to_le_bytes()).collect();
        let sf = MemoryStreamFile::new("ramp.raw", data).into_ref();

        let mut vgm = VgmStream::allocate(1, looped).unwrap();
        vgm.coding_type = CodingType::Pcm16Le;
        vgm.sample_rate = 8000;
        vgm.num_samples = samples;
        vgm.ch[0].streamfile = Some(sf);
        vgm.capture_start();
        vgm
    }

    #[test]
    fn test_render_to_end() {
        let mut vgm = ramp_stream(10, false);
        let mut buf = [0i16; 6];
        assert_eq!(vgm.render(&mut buf).unwrap(), 6);
        assert_eq!(buf, [0, 1, 2, 3, 4, 5]);
        assert_eq!(vgm.render(&mut buf).unwrap(), 4);
        assert_eq!(buf, [6, 7, 8, 9, 0, 0]);
        assert_eq!(vgm.render(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_loop_wraps() {
        let mut vgm = ramp_stream(10, true);
        vgm.loop_start_sample = 2;
        vgm.loop_end_sample = 5;
        vgm.capture_start();

        let mut buf = [0i16; 10];
        assert_eq!(vgm.render(&mut buf).unwrap(), 10);
        assert_eq!(buf, [0, 1, 2, 3, 4, 2, 3, 4, 2, 3]);
    }
}
