//! Types for the speech adapters
//!
//! Contains the PCM buffer, the WAV container, transcription results and
//! synthesis requests.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Sample rate of every PCM buffer and container in the pipeline
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Channel count of every PCM buffer and container in the pipeline
pub const CHANNELS: u16 = 1;

/// Bytes per sample (signed 16-bit)
pub const SAMPLE_WIDTH_BYTES: u16 = 2;

/// Samples produced by one successfully decoded packet (60 ms at 16 kHz)
pub const FRAME_SAMPLES: usize = 960;

/// Mono, 16-bit, 16 kHz linear PCM
///
/// Grows one decoded frame at a time; packets that fail to decode add
/// nothing, so the buffer is never padded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    frames: usize,
}

impl PcmBuffer {
    /// Create an empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
            frames: 0,
        }
    }

    /// Wrap raw samples, counted as a single block
    #[must_use]
    pub fn from_samples(samples: Vec<i16>) -> Self {
        let frames = usize::from(!samples.is_empty());
        Self { samples, frames }
    }

    /// Append one decoded frame
    pub fn push_frame(&mut self, frame: &[i16]) {
        self.samples.extend_from_slice(frame);
        self.frames += 1;
    }

    /// Decoded samples in playback order
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of frames appended so far
    #[must_use]
    pub const fn frame_blocks(&self) -> usize {
        self.frames
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples were decoded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Size of the samples once serialized
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.samples.len() * usize::from(SAMPLE_WIDTH_BYTES)
    }
}

/// Encoded WAV bytes: a RIFF header followed by the raw samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioContainer {
    data: Vec<u8>,
}

impl AudioContainer {
    pub(crate) const fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// MIME type sent alongside the container
    pub const MIME_TYPE: &'static str = "audio/wav";

    /// File name sent alongside the container
    pub const FILE_NAME: &'static str = "audio.wav";

    /// Raw container bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw container bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Total size including the header
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the container holds no bytes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Header values read back from an [`AudioContainer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Channel count
    pub channels: u16,
    /// Bytes per sample
    pub sample_width: u16,
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Number of frames (samples per channel)
    pub frame_count: u32,
    /// Length of the sample data in bytes
    pub byte_length: usize,
}

impl ContainerInfo {
    /// Bytes of audio per second of playback
    #[must_use]
    pub fn byte_rate(&self) -> u64 {
        u64::from(self.channels) * u64::from(self.sample_width) * u64::from(self.sample_rate)
    }
}

/// Result of a transcription
///
/// `text` is always trimmed. On the degraded path `text` is empty and
/// `error` names what went wrong; an empty `text` with no `error` means the
/// backend genuinely returned nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text
    pub text: String,
    /// Reason the transcription degraded, if it did
    pub error: Option<ErrorKind>,
}

impl Transcription {
    /// Successful transcription
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            error: None,
        }
    }

    /// Degraded transcription carrying the failure reason
    #[must_use]
    pub const fn failed(kind: ErrorKind) -> Self {
        Self {
            text: String::new(),
            error: Some(kind),
        }
    }

    /// Check if there is no text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Synthesis request, forwarded verbatim to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Voice identifier
    pub voice_id: String,
    /// Requested audio format
    pub response_format: String,
    /// Model identifier
    pub model: String,
}

/// One compressed packet as received from the client transport
pub type Packet = Bytes;
