//! Output of rendered audio

pub mod wav;

pub use wav::WavEncoder;

use crate::core::AudioFrame;
use crate::error::VgmResult;

/// Sink for rendered session output
pub trait Encoder {
    /// Append one rendered frame
    fn encode(&mut self, frame: &AudioFrame) -> VgmResult<()>;

    /// Write trailing headers; later frames are rejected
    fn finalize(&mut self) -> VgmResult<()> {
        Ok(())
    }
}
