//! Speech adapter errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while transcribing or synthesizing speech
#[derive(Debug, Error)]
pub enum SpeechError {
    /// A single compressed packet could not be decoded
    #[error("Packet decode failed at index {index}: {reason}")]
    PacketDecode {
        /// Position of the packet within its sequence
        index: usize,
        /// Decoder error message
        reason: String,
    },

    /// The codec itself could not be set up
    #[error("Codec error: {0}")]
    Codec(String),

    /// WAV framing or header read-back failed
    #[error("Container error: {0}")]
    Container(String),

    /// Transcription endpoint answered with a non-success status
    #[error("Backend rejected request: HTTP {status}: {body}")]
    BackendRejected {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// Response body could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Every credential in the pool failed for one request
    #[error("All {attempts} credentials exhausted, last error: {last_error}")]
    CredentialsExhausted {
        /// Number of attempts made, one per credential
        attempts: usize,
        /// Message of the final failed attempt
        last_error: String,
    },

    /// Network-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Writing synthesized audio to its destination failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`SpeechError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Per-packet decode failure
    PacketDecodeFailure,
    /// Codec could not be created
    Codec,
    /// WAV framing failure
    Container,
    /// Non-success status from the transcription backend
    BackendRejected,
    /// Response body could not be parsed
    MalformedResponse,
    /// Credential pool exhausted
    CredentialsExhausted,
    /// Network-level failure
    TransportError,
    /// Invalid configuration
    Configuration,
    /// Destination I/O failure
    Io,
}

impl SpeechError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PacketDecode { .. } => ErrorKind::PacketDecodeFailure,
            Self::Codec(_) => ErrorKind::Codec,
            Self::Container(_) => ErrorKind::Container,
            Self::BackendRejected { .. } => ErrorKind::BackendRejected,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::CredentialsExhausted { .. } => ErrorKind::CredentialsExhausted,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Transport(format!("connection failed: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<hound::Error> for SpeechError {
    fn from(err: hound::Error) -> Self {
        Self::Container(err.to_string())
    }
}

impl From<audiopus::Error> for SpeechError {
    fn from(err: audiopus::Error) -> Self {
        Self::Codec(err.to_string())
    }
}
