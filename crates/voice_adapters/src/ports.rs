//! Port definitions for the speech adapters
//!
//! Defines the traits (ports) that transcription and synthesis adapters
//! implement. The two directions deliberately differ in how they fail:
//! transcription degrades to an empty result, synthesis returns an error.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SpeechError;
use crate::types::{Packet, SynthesisRequest, Transcription};

/// Port for Speech-to-Text (STT) implementations
///
/// # Example
///
/// ```ignore
/// use voice_adapters::SpeechToText;
///
/// async fn on_utterance(stt: &impl SpeechToText, packets: Vec<Bytes>, session: &str) {
///     let transcription = stt.transcribe(&packets, session).await;
///     if !transcription.is_empty() {
///         println!("heard: {}", transcription.text);
///     }
/// }
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe one utterance worth of compressed packets
    ///
    /// Never fails: any error along the way yields an empty text with the
    /// failure recorded in [`Transcription::error`].
    async fn transcribe(&self, packets: &[Packet], session_id: &str) -> Transcription;

    /// Release any per-session state held for `session_id`
    fn end_session(&self, session_id: &str);

    /// Get the name of the transcription model
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `request` and return the raw audio body
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::CredentialsExhausted` if no credential produced
    /// a successful response.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes, SpeechError>;

    /// Synthesize `request` and write the audio verbatim to `destination`
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns the synthesis error, or `SpeechError::Io` if writing fails.
    async fn synthesize_into<W>(
        &self,
        request: &SynthesisRequest,
        destination: &mut W,
    ) -> Result<u64, SpeechError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let audio = self.synthesize(request).await?;
        destination.write_all(&audio).await?;
        destination.flush().await?;
        Ok(audio.len() as u64)
    }
}
