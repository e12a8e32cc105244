//! Speech provider implementations
//!
//! Contains concrete implementations of the `SpeechToText` and `TextToSpeech` traits.

pub mod coze;
pub mod openai_compat;

pub use coze::CozeSpeechSynthesizer;
pub use openai_compat::OpenAiCompatibleTranscriber;
