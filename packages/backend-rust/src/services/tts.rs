use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{env_parse, env_string};

const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";
const DEFAULT_LANGUAGE: &str = "th";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// The provider rejects requests without a browser-like client identity.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub endpoint: String,
    pub language: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl TtsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env_string("TTS_ENDPOINT").unwrap_or(defaults.endpoint),
            language: env_string("TTS_LANGUAGE").unwrap_or(defaults.language),
            user_agent: env_string("TTS_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout: env_parse::<u64>("TTS_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }
}

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("no text to synthesize")]
    EmptyText,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}")]
    HttpStatus { status: reqwest::StatusCode },
}

/// Relay to the third-party speech provider
#[derive(Clone)]
pub struct TtsClient {
    config: TtsConfig,
    client: reqwest::Client,
}

impl TtsClient {
    pub fn new(config: TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(TtsConfig::from_env())
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    /// Provider URL for one fragment, in the query shape the provider expects
    pub fn request_url(&self, text: &str) -> String {
        format!(
            "{}?ie=UTF-8&q={}&tl={}&client=tw-ob",
            self.config.endpoint.trim_end_matches('?'),
            urlencoding::encode(text),
            urlencoding::encode(&self.config.language),
        )
    }

    /// Fetches the audio for `text`. Any non-2xx answer is an error so callers
    /// never relay a partial or error body as audio.
    pub async fn synthesize(&self, text: &str) -> Result<Bytes, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        let url = self.request_url(text);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, chars = text.chars().count(), "tts provider rejected request");
            return Err(TtsError::HttpStatus { status });
        }

        let audio = response.bytes().await?;
        debug!(bytes = audio.len(), chars = text.chars().count(), "tts audio received");
        Ok(audio)
    }
}
