//! Coze speech synthesis provider
//!
//! Posts to `/v1/audio/speech` and rotates through the configured access
//! tokens until one of them gets a successful response.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::SynthesisConfig;
use crate::error::SpeechError;
use crate::failover::CredentialPool;
use crate::ports::TextToSpeech;
use crate::types::SynthesisRequest;

/// Coze TTS request body
#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice_id: &'a str,
    response_format: &'a str,
}

impl<'a> From<&'a SynthesisRequest> for SpeechBody<'a> {
    fn from(request: &'a SynthesisRequest) -> Self {
        Self {
            model: &request.model,
            input: &request.text,
            voice_id: &request.voice_id,
            response_format: &request.response_format,
        }
    }
}

/// Coze speech synthesis with access token failover
#[derive(Debug, Clone)]
pub struct CozeSpeechSynthesizer {
    client: Client,
    config: SynthesisConfig,
    credentials: CredentialPool,
}

impl CozeSpeechSynthesizer {
    /// Create a new synthesizer
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid,
    /// including when the token list holds no usable entry.
    pub fn new(config: SynthesisConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let credentials = CredentialPool::new(config.access_tokens())?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        debug!(credentials = credentials.len(), "Coze synthesizer initialized");

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// Build a request for `text` with the configured model, voice and format
    #[must_use]
    pub fn request_for(&self, text: impl Into<String>) -> SynthesisRequest {
        self.config.request_for(text)
    }

    /// One request with one credential
    async fn attempt(
        &self,
        index: usize,
        body: &SpeechBody<'_>,
        credential: &SecretString,
    ) -> Result<Bytes, SpeechError> {
        debug!(credential_index = index, "Sending synthesis request");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(credential.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::BackendRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl TextToSpeech for CozeSpeechSynthesizer {
    #[instrument(
        skip(self, request),
        fields(text_len = request.text.len(), voice = %request.voice_id)
    )]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes, SpeechError> {
        let body = SpeechBody::from(request);
        let body = &body;

        let audio = self
            .credentials
            .dispatch(move |index, credential| self.attempt(index, body, credential))
            .await?;

        debug!(audio_size = audio.len(), "Speech synthesis complete");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn create_test_synthesizer(mock_server: &MockServer, tokens: &str) -> CozeSpeechSynthesizer {
        let config = SynthesisConfig {
            api_url: format!("{}/v1/audio/speech", mock_server.uri()),
            access_token: Some(SecretString::from(tokens)),
            model: "cozyvoice".to_string(),
            voice: Some("7426720361733046281".to_string()),
            ..Default::default()
        };
        CozeSpeechSynthesizer::new(config).unwrap()
    }

    async fn mount_for_token(mock_server: &MockServer, token: &str, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(template)
            .expect(1)
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn synthesize_success_with_first_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("authorization", "Bearer tok-a"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "model": "cozyvoice",
                "input": "Hello",
                "voice_id": "7426720361733046281",
                "response_format": "mp3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 1024]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let synthesizer = create_test_synthesizer(&mock_server, "tok-a,tok-b");
        let request = synthesizer.request_for("Hello");

        let audio = synthesizer.synthesize(&request).await.unwrap();

        assert_eq!(audio.len(), 1024);
        assert!(audio.iter().all(|&b| b == 9));
    }

    #[tokio::test]
    async fn failed_token_rotates_to_next() {
        let mock_server = MockServer::start().await;
        mount_for_token(&mock_server, "tok-a", ResponseTemplate::new(401)).await;
        mount_for_token(
            &mock_server,
            "tok-b",
            ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()),
        )
        .await;

        let synthesizer = create_test_synthesizer(&mock_server, "tok-a,tok-b");
        let request = synthesizer.request_for("Hello");

        let audio = synthesizer.synthesize(&request).await.unwrap();

        assert_eq!(&audio[..], b"ID3audio");
    }

    #[tokio::test]
    async fn all_tokens_failing_is_fatal() {
        let mock_server = MockServer::start().await;
        mount_for_token(&mock_server, "tok-a", ResponseTemplate::new(500)).await;
        mount_for_token(&mock_server, "tok-b", ResponseTemplate::new(429)).await;

        let synthesizer = create_test_synthesizer(&mock_server, "tok-a,tok-b");
        let request = synthesizer.request_for("Hello");

        let result = synthesizer.synthesize(&request).await;

        assert!(matches!(
            result,
            Err(SpeechError::CredentialsExhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn synthesize_into_writes_body_verbatim() {
        let mock_server = MockServer::start().await;
        mount_for_token(
            &mock_server,
            "tok-a",
            ResponseTemplate::new(200).set_body_bytes(b"RIFFDATA".to_vec()),
        )
        .await;

        let synthesizer = create_test_synthesizer(&mock_server, "tok-a");
        let request = synthesizer.request_for("Hello");
        let mut destination = tokio_test::io::Builder::new().write(b"RIFFDATA").build();

        let written = synthesizer
            .synthesize_into(&request, &mut destination)
            .await
            .unwrap();

        assert_eq!(written, 8);
    }

    #[tokio::test]
    async fn synthesize_into_skips_write_on_failure() {
        let mock_server = MockServer::start().await;
        mount_for_token(&mock_server, "tok-a", ResponseTemplate::new(503)).await;

        let synthesizer = create_test_synthesizer(&mock_server, "tok-a");
        let request = synthesizer.request_for("Hello");
        let mut destination = Vec::new();

        let result = synthesizer.synthesize_into(&request, &mut destination).await;

        assert!(matches!(
            result,
            Err(SpeechError::CredentialsExhausted { .. })
        ));
        assert!(destination.is_empty());
    }

    #[test]
    fn new_fails_without_usable_tokens() {
        let config = SynthesisConfig {
            access_token: Some(SecretString::from(" , ")),
            model: "cozyvoice".to_string(),
            ..Default::default()
        };

        let result = CozeSpeechSynthesizer::new(config);

        assert!(matches!(result, Err(SpeechError::Configuration(_))));
    }

    #[test]
    fn request_body_uses_wire_field_names() {
        let request = SynthesisRequest {
            text: "Hi".to_string(),
            voice_id: "v".to_string(),
            response_format: "wav".to_string(),
            model: "m".to_string(),
        };

        let json = serde_json::to_value(SpeechBody::from(&request)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "input": "Hi",
                "voice_id": "v",
                "response_format": "wav"
            })
        );
    }
}
