//! OpenAI-compatible transcription provider
//!
//! Runs the whole packet pipeline for one utterance and posts the resulting
//! WAV to an OpenAI-style `/audio/transcriptions` endpoint (Groq by default).
//!
//! # Response shapes
//!
//! Backends asked for `response_format=text` still answer in one of three
//! shapes, tried in this order:
//!
//! 1. JSON object with `data.text`
//! 2. JSON object with top-level `text`
//! 3. anything else, taken verbatim as the text

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::codec::{self, SessionDecoders};
use crate::config::TranscriptionConfig;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioContainer, Packet, Transcription};

/// Transcription provider for OpenAI-compatible endpoints
#[derive(Debug)]
pub struct OpenAiCompatibleTranscriber {
    client: Client,
    config: TranscriptionConfig,
    decoders: SessionDecoders,
}

impl OpenAiCompatibleTranscriber {
    /// Create a new transcriber
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: TranscriptionConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            decoders: SessionDecoders::opus(),
        })
    }

    /// Decode, frame and size one utterance
    ///
    /// Returns the container and the advisory segment size in bytes.
    fn prepare(
        &self,
        packets: &[Packet],
        session_id: &str,
    ) -> Result<(AudioContainer, u64), SpeechError> {
        let pcm = self.decoders.decode(session_id, packets)?;
        let container = codec::encode(&pcm)?;

        let info = codec::read_info(container.as_bytes())?;
        let segment_size = codec::size_for(info.byte_rate(), self.config.segment_duration_ms);

        debug!(
            frames = info.frame_count,
            data_bytes = info.byte_length,
            segment_size,
            "Prepared WAV container"
        );

        Ok((container, segment_size))
    }

    /// Upload the container and read back the text
    async fn send(&self, container: AudioContainer) -> Result<String, SpeechError> {
        let file_part = Part::bytes(container.into_bytes())
            .file_name(AudioContainer::FILE_NAME)
            .mime_str(AudioContainer::MIME_TYPE)
            .map_err(|e| SpeechError::Container(format!("Invalid MIME type: {e}")))?;

        let form = Form::new()
            .text("model", self.config.model.clone())
            .part("file", file_part)
            .text("response_format", "text");

        let mut request = self.client.post(&self.config.api_url).multipart(form);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::BackendRejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(ResponseText::interpret(&body).into_text())
    }

    async fn try_transcribe(
        &self,
        packets: &[Packet],
        session_id: &str,
    ) -> Result<String, SpeechError> {
        let (container, _segment_size) = self.prepare(packets, session_id)?;
        // The container goes out whole; the backend accepts a single file.
        self.send(container).await
    }
}

/// Where the transcription text was found in a response body
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResponseText {
    /// `{"data": {"text": ...}}`
    DataText(String),
    /// `{"text": ...}`
    Text(String),
    /// Body taken as-is
    Raw(String),
}

impl ResponseText {
    /// Classify `body`; never fails
    fn interpret(body: &str) -> Self {
        let trimmed = body.trim();
        if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
            return Self::Raw(trimmed.to_string());
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(e) => {
                let err = SpeechError::MalformedResponse(e.to_string());
                warn!("{err}, using raw body");
                return Self::Raw(trimmed.to_string());
            },
        };

        if let Some(text) = value.pointer("/data/text").and_then(Value::as_str) {
            return Self::DataText(text.trim().to_string());
        }
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return Self::Text(text.trim().to_string());
        }

        debug!("JSON response without a text field, using raw body");
        Self::Raw(trimmed.to_string())
    }

    fn into_text(self) -> String {
        match self {
            Self::DataText(text) | Self::Text(text) | Self::Raw(text) => text,
        }
    }
}

#[async_trait]
impl SpeechToText for OpenAiCompatibleTranscriber {
    #[instrument(skip(self, packets), fields(packets = packets.len(), model = %self.config.model))]
    async fn transcribe(&self, packets: &[Packet], session_id: &str) -> Transcription {
        let started = Instant::now();

        match self.try_transcribe(packets, session_id).await {
            Ok(text) => {
                let transcription = Transcription::new(text);
                debug!(
                    elapsed_ms = started.elapsed().as_millis(),
                    text_len = transcription.text.len(),
                    "Transcription complete"
                );
                transcription
            },
            Err(e) => {
                error!(kind = ?e.kind(), "Transcription failed: {e}");
                Transcription::failed(e.kind())
            },
        }
    }

    fn end_session(&self, session_id: &str) {
        self.decoders.end_session(session_id);
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
