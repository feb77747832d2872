//! Stream session and its tags

/// Session record, snapshots and lifecycle
pub mod stream;
/// Codec, layout and format tags
pub mod types;
/// Interleaved PCM frames handed to filters and encoders
pub mod frame;

mod describe;

pub use frame::AudioFrame;
pub use stream::{MAX_CHANNELS, BlockPosition, CodecData, Snapshot, VgmStream, VgmStreamChannel};
pub use types::{BlockedLayout, CodingType, LayoutType, MetaType, Sample};
