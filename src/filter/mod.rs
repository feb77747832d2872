//! Filters applied to rendered audio

pub mod fade;

pub use fade::Fade;

use crate::core::AudioFrame;
use crate::error::VgmResult;

/// Trait for audio filters
pub trait Filter {
    /// Process an audio frame through this filter
    fn process(&mut self, frame: &AudioFrame) -> VgmResult<AudioFrame>;
}
