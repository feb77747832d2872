use super::stream::{CodecData, VgmStream};
use std::fmt::Write;

impl VgmStream {
    /// Multi-line summary of the session for diagnostics
    pub fn describe(&self) -> String {
        let mut desc = String::new();
        let rate = self.sample_rate.max(1) as f64;

        // Writing into a String cannot fail
        let _ = writeln!(desc, "sample rate: {} Hz", self.sample_rate);
        let _ = writeln!(desc, "channels: {}", self.channels());

        if self.loop_flag {
            let _ = writeln!(
                desc,
                "loop start: {} samples ({:.2} seconds)",
                self.loop_start_sample,
                self.loop_start_sample as f64 / rate
            );
            let _ = writeln!(
                desc,
                "loop end: {} samples ({:.2} seconds)",
                self.loop_end_sample,
                self.loop_end_sample as f64 / rate
            );
        }

        let _ = writeln!(
            desc,
            "stream total samples: {} ({:.2} seconds)",
            self.num_samples,
            self.num_samples as f64 / rate
        );
        let _ = writeln!(desc, "encoding: {}", self.coding_type.description());
        let _ = writeln!(desc, "layout: {}", self.layout_type.description());

        if self.layout_type.is_interleave() {
            let _ = writeln!(desc, "interleave: {:#x} bytes", self.interleave_block_size);
            if self.layout_type == super::LayoutType::InterleaveShortblock {
                let _ = writeln!(
                    desc,
                    "last block interleave: {:#x} bytes",
                    self.interleave_smallblock_size
                );
            }
        }

        if let CodecData::Segmented(data) = &self.codec_data {
            let _ = writeln!(desc, "segments: {}", data.segment_count());
        }

        let _ = write!(desc, "metadata from: {}", self.meta_type.description());
        desc
    }
}
