//! Synthesis service HTTP client
//!
//! One POST per spoken line. Failures are logged and propagated; there is no
//! retry or backoff, the caller decides what to do with a failed line.

use crate::speech::request::{SynthesisRequest, SynthesisResponse};
use crate::{NarratorError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, error};
use reqwest::Client;
use std::time::Duration;

/// Transport-level timeout for one synthesis call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the text-to-speech service
pub struct SynthesisClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SynthesisClient {
    /// Create a client for the given endpoint
    ///
    /// `base_url` has no trailing slash, e.g.
    /// `https://texttospeech.googleapis.com/v1`. Tests point it at a local
    /// mock server.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Synthesize one request, returning the raw MP3 bytes
    ///
    /// Decodes the response's base64 `audioContent` before returning, so the
    /// caller only ever sees playable bytes or an error.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>> {
        let url = format!("{}/text:synthesize", self.base_url);
        debug!(
            "Requesting synthesis of {} chars ({})",
            request.input.text.len(),
            request.voice.language_code
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Synthesis request failed: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Synthesis service returned {}: {}", status, message);
            return Err(NarratorError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: SynthesisResponse = response.json().await.map_err(|e| {
            error!("Unreadable synthesis response: {}", e);
            e
        })?;

        decode_audio_content(&body.audio_content)
    }
}

/// Decode a base64 audio payload into raw bytes
pub fn decode_audio_content(audio_content: &str) -> Result<Vec<u8>> {
    let bytes = BASE64.decode(audio_content).map_err(|e| {
        error!("Malformed audio payload: {}", e);
        e
    })?;
    debug!("Decoded {} bytes of audio", bytes.len());
    Ok(bytes)
}
