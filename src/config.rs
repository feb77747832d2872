//! Playback length settings

use crate::core::VgmStream;
use crate::error::{VgmError, VgmResult};

/// How long a looped stream plays and how it ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Times the loop body is played
    pub loop_count: f64,
    /// Length of the fade-out in seconds
    pub fade_seconds: f64,
    /// Time played past the last loop before the fade starts
    pub fade_delay_seconds: f64,
    /// Play the stream once, as if it had no loop
    pub ignore_loop: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            loop_count: 2.0,
            fade_seconds: 10.0,
            fade_delay_seconds: 0.0,
            ignore_loop: false,
        }
    }
}

impl PlaybackConfig {
    /// Default settings: two loops and a ten second fade
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the loop count
    pub fn with_loop_count(mut self, loop_count: f64) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Set the fade length
    pub fn with_fade_seconds(mut self, fade_seconds: f64) -> Self {
        self.fade_seconds = fade_seconds;
        self
    }

    /// Set the delay before the fade
    pub fn with_fade_delay_seconds(mut self, fade_delay_seconds: f64) -> Self {
        self.fade_delay_seconds = fade_delay_seconds;
        self
    }

    /// Play once without looping
    pub fn with_ignore_loop(mut self, ignore_loop: bool) -> Self {
        self.ignore_loop = ignore_loop;
        self
    }

    /// Reject negative or non-finite values
    pub fn validate(&self) -> VgmResult<()> {
        for (name, value) in [
            ("loop count", self.loop_count),
            ("fade", self.fade_seconds),
            ("fade delay", self.fade_delay_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(VgmError::ConfigError(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl VgmStream {
    /// Total samples to render for `config`; the fade is only applied to looped streams
    pub fn play_samples_with(&self, config: &PlaybackConfig) -> usize {
        if config.ignore_loop {
            return self.num_samples;
        }
        self.play_samples(config.loop_count, config.fade_seconds, config.fade_delay_seconds)
    }
}
