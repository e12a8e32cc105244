//! Configuration for the transcription and synthesis adapters

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::codec::segment::DEFAULT_SEGMENT_DURATION_MS;
use crate::types::SynthesisRequest;

/// Configuration for an OpenAI-compatible transcription endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Full URL of the transcription endpoint
    #[serde(default = "default_transcription_url")]
    pub api_url: String,

    /// Bearer token for the endpoint (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Transcription model identifier
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// Target segment duration used for segment sizing
    #[serde(default = "default_segment_duration_ms")]
    pub segment_duration_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl std::fmt::Debug for TranscriptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionConfig")
            .field("api_url", &self.api_url)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("model", &self.model)
            .field("segment_duration_ms", &self.segment_duration_ms)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_transcription_url() -> String {
    "https://api.groq.com/openai/v1/audio/transcriptions".to_string()
}

fn default_transcription_model() -> String {
    "whisper-large-v3".to_string()
}

const fn default_segment_duration_ms() -> u64 {
    DEFAULT_SEGMENT_DURATION_MS
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_url: default_transcription_url(),
            api_key: None,
            model: default_transcription_model(),
            segment_duration_ms: default_segment_duration_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl TranscriptionConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_none() {
            return Err("API key is required for the transcription endpoint".to_string());
        }

        if self.api_url.trim().is_empty() {
            return Err("Transcription API URL must not be empty".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("Transcription model must not be empty".to_string());
        }

        if self.segment_duration_ms == 0 {
            return Err("Segment duration must be greater than 0".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Configuration for the Coze speech synthesis endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Full URL of the synthesis endpoint
    #[serde(default = "default_synthesis_url")]
    pub api_url: String,

    /// Comma-separated access tokens, tried in order (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub access_token: Option<SecretString>,

    /// Synthesis model identifier
    #[serde(default)]
    pub model: String,

    /// Stock voice identifier
    #[serde(default)]
    pub voice: Option<String>,

    /// Cloned/private voice identifier, takes precedence over `voice`
    #[serde(default)]
    pub private_voice: Option<String>,

    /// Requested audio format of the response body
    #[serde(default = "default_response_format")]
    pub response_format: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl std::fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("api_url", &self.api_url)
            .field(
                "access_token",
                &if self.access_token.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("private_voice", &self.private_voice)
            .field("response_format", &self.response_format)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_synthesis_url() -> String {
    "https://api.coze.cn/v1/audio/speech".to_string()
}

fn default_response_format() -> String {
    "mp3".to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_url: default_synthesis_url(),
            access_token: None,
            model: String::new(),
            voice: None,
            private_voice: None,
            response_format: default_response_format(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SynthesisConfig {
    /// Voice to request: the private voice if configured, else the stock voice
    #[must_use]
    pub fn effective_voice(&self) -> Option<&str> {
        self.private_voice
            .as_deref()
            .or(self.voice.as_deref())
    }

    /// Split the configured access token list into individual tokens
    ///
    /// Entries are trimmed and blank entries are dropped.
    #[must_use]
    pub fn access_tokens(&self) -> Vec<SecretString> {
        self.access_token
            .as_ref()
            .map(|raw| {
                raw.expose_secret()
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(SecretString::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Build a request for `text` using the configured model, voice and format
    #[must_use]
    pub fn request_for(&self, text: impl Into<String>) -> SynthesisRequest {
        SynthesisRequest {
            text: text.into(),
            voice_id: self.effective_voice().unwrap_or_default().to_string(),
            response_format: self.response_format.clone(),
            model: self.model.clone(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_tokens().is_empty() {
            return Err("At least one access token is required".to_string());
        }

        if self.api_url.trim().is_empty() {
            return Err("Synthesis API URL must not be empty".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("Synthesis model must not be empty".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesis_with_tokens(raw: &str) -> SynthesisConfig {
        SynthesisConfig {
            access_token: Some(SecretString::from(raw)),
            model: "tts-model".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn transcription_defaults() {
        let config = TranscriptionConfig::default();

        assert_eq!(
            config.api_url,
            "https://api.groq.com/openai/v1/audio/transcriptions"
        );
        assert_eq!(config.model, "whisper-large-v3");
        assert_eq!(config.segment_duration_ms, 15000);
        assert_eq!(config.timeout_ms, 30000);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn transcription_validate_requires_api_key() {
        let mut config = TranscriptionConfig::default();
        assert!(config.validate().is_err());

        config.api_key = Some(SecretString::from("gsk-test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn transcription_validate_rejects_zero_segment_duration() {
        let config = TranscriptionConfig {
            api_key: Some(SecretString::from("gsk-test")),
            segment_duration_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn transcription_debug_redacts_key() {
        let config = TranscriptionConfig {
            api_key: Some(SecretString::from("gsk-very-secret")),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("gsk-very-secret"));
    }

    #[test]
    fn access_tokens_are_split_and_trimmed() {
        let config = synthesis_with_tokens(" tok-a , ,tok-b,, tok-c ");
        let tokens: Vec<String> = config
            .access_tokens()
            .iter()
            .map(|t| t.expose_secret().to_string())
            .collect();

        assert_eq!(tokens, vec!["tok-a", "tok-b", "tok-c"]);
    }

    #[test]
    fn synthesis_validate_rejects_blank_token_list() {
        let config = synthesis_with_tokens(" , ,");
        assert!(config.validate().is_err());

        let config = SynthesisConfig {
            model: "tts-model".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn synthesis_validate_requires_model() {
        let mut config = synthesis_with_tokens("tok-a");
        config.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn private_voice_takes_precedence() {
        let mut config = synthesis_with_tokens("tok-a");
        config.voice = Some("stock".to_string());
        assert_eq!(config.effective_voice(), Some("stock"));

        config.private_voice = Some("cloned".to_string());
        assert_eq!(config.effective_voice(), Some("cloned"));
    }

    #[test]
    fn request_for_uses_configured_fields() {
        let mut config = synthesis_with_tokens("tok-a");
        config.voice = Some("7426720361733046281".to_string());
        config.response_format = "wav".to_string();

        let request = config.request_for("Hello");

        assert_eq!(request.text, "Hello");
        assert_eq!(request.voice_id, "7426720361733046281");
        assert_eq!(request.response_format, "wav");
        assert_eq!(request.model, "tts-model");
    }

    #[test]
    fn synthesis_debug_redacts_tokens() {
        let config = synthesis_with_tokens("pat_secret_1,pat_secret_2");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("pat_secret_1"));
    }

    #[test]
    fn configs_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Both {
            transcription: TranscriptionConfig,
            synthesis: SynthesisConfig,
        }

        let toml = r#"
            [transcription]
            api_key = "gsk-test"
            model = "whisper-large-v3-turbo"
            segment_duration_ms = 10000

            [synthesis]
            access_token = "pat_a,pat_b"
            model = "cozyvoice"
            voice = "stock"
            private_voice = "cloned"
            response_format = "wav"
            timeout_ms = 60000
        "#;

        let both: Both = toml::from_str(toml).unwrap();

        assert_eq!(both.transcription.model, "whisper-large-v3-turbo");
        assert_eq!(both.transcription.segment_duration_ms, 10000);
        assert_eq!(
            both.transcription.api_url,
            "https://api.groq.com/openai/v1/audio/transcriptions"
        );
        assert!(both.transcription.validate().is_ok());

        assert_eq!(both.synthesis.access_tokens().len(), 2);
        assert_eq!(both.synthesis.effective_voice(), Some("cloned"));
        assert_eq!(both.synthesis.response_format, "wav");
        assert_eq!(both.synthesis.timeout_ms, 60000);
        assert_eq!(both.synthesis.api_url, "https://api.coze.cn/v1/audio/speech");
        assert!(both.synthesis.validate().is_ok());
    }
}
