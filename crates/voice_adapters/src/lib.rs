//! Voice Adapters - transcription and synthesis backends for a voice assistant
//!
//! Provides two adapters:
//! - `SpeechToText` - turns a client's Opus packet stream into text
//! - `TextToSpeech` - turns assistant text into audio, failing over across
//!   a pool of access tokens
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//! - `codec` module holds the packet → PCM → WAV pipeline
//! - `failover` module holds the credential rotation loop
//!
//! # Example
//!
//! ```ignore
//! use voice_adapters::{
//!     CozeSpeechSynthesizer, OpenAiCompatibleTranscriber, SpeechToText, TextToSpeech,
//! };
//!
//! let stt = OpenAiCompatibleTranscriber::new(transcription_config)?;
//! let transcription = stt.transcribe(&packets, "session-42").await;
//!
//! let tts = CozeSpeechSynthesizer::new(synthesis_config)?;
//! let audio = tts.synthesize(&tts.request_for("Hello!")).await?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod failover;
pub mod ports;
pub mod providers;
pub mod types;

pub use codec::{PacketDecoder, SessionDecoders};
pub use config::{SynthesisConfig, TranscriptionConfig};
pub use error::{ErrorKind, SpeechError};
pub use failover::CredentialPool;
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::{CozeSpeechSynthesizer, OpenAiCompatibleTranscriber};
pub use types::{AudioContainer, ContainerInfo, PcmBuffer, SynthesisRequest, Transcription};
