//! Audio transcoding pipeline
//!
//! Turns a sequence of Opus packets into a WAV container:
//!
//! ```text
//! packets ──▶ PacketDecoder ──▶ PcmBuffer ──▶ container::encode ──▶ AudioContainer
//!                                                     │
//!                                                     ▼
//!                                            segment::size_for
//! ```

pub mod container;
pub mod decoder;
pub mod segment;

pub use container::{encode, read_info};
pub use decoder::{FrameDecoder, OpusFrameDecoder, PacketDecoder, SessionDecoders};
pub use segment::{DEFAULT_SEGMENT_DURATION_MS, size_for};
