#![warn(missing_docs)]

//! # vgmstream-rs: streaming decoder for game audio formats
//!
//! Identifies which of many game-audio container formats a byte source
//! holds, builds a decode session for it and renders interleaved 16-bit PCM
//! on demand, with sample-accurate loop playback.
//!
//! ## Features
//!
//! - **Detect** - ADX, RSTM, AST, HALPST, DSP, VAG, RIFF WAVE, Ogg Vorbis, GENH, TXTP playlists, raw PCM
//! - **Layouts** - flat, fixed interleave (with short last block), self-describing blocks, segments
//! - **Codecs** - PCM variants, DSP/AFC/PSX/ADX/IMA ADPCM, Vorbis via symphonia
//! - **Loops** - exact jump from loop end back to loop start with codec state restored
//! - **CLI** - `vgmstream info` and `vgmstream decode` to WAV
//!
//! ## Quick Start
//!
//! ```ignore
//! use vgmstream_rs::{PlaybackConfig, VgmStream};
//!
//! let mut vgm = VgmStream::open("bgm.dsp")?;
//! let total = vgm.play_samples_with(&PlaybackConfig::new());
//!
//! let mut buffer = vec![0i16; 4096 * vgm.channels()];
//! let mut rendered = 0;
//! while rendered < total {
//!     let frames = vgm.render(&mut buffer)?;
//!     if frames == 0 {
//!         break;
//!     }
//!     rendered += frames;
//! }
//! ```

/// Per-codec decode steps and the dispatch between them
pub mod coding;
/// Playback length settings
pub mod config;
/// Stream session, tags and rendered frames
pub mod core;
/// Rendered audio output
pub mod encoder;
/// Error types
pub mod error;
/// Filters on rendered audio
pub mod filter;
/// Block stepping strategies
pub mod layout;
/// Loop boundary detection and snapshot restore
pub mod looping;
/// Format detection and header parsers
pub mod meta;
/// Byte sources
pub mod streamfile;

pub use config::PlaybackConfig;
pub use core::{AudioFrame, CodingType, LayoutType, MetaType, Sample, VgmStream};
pub use error::{VgmError, VgmResult};
pub use looping::LoopState;
pub use meta::detect;
pub use streamfile::{MemoryStreamFile, StdioStreamFile, StreamFile, StreamFileRef};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
