//! Speech playback sequencing
//!
//! [`SpeechPlayer`] owns one character's voice profile and the audio pipeline.
//! One `start()` call runs a single linear sequence:
//!
//! 1. Build the request payload from the profile and any overrides
//! 2. Call the synthesis service
//! 3. Decode the returned audio and begin playback
//! 4. Settle on natural completion (after the caller's trailing delay) or on
//!    the playback ceiling, whichever comes first

use crate::config::{Config, VoicePreset, DEFAULT_CEILING_MS};
use crate::speech::audio::{create_backend, AudioBackend};
use crate::speech::client::SynthesisClient;
use crate::speech::request::SynthesisRequest;
use crate::Result;
use log::debug;
use std::time::Duration;

/// How often the player checks playback for its natural end
const END_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One character's speaking style, fixed for the player's lifetime
#[derive(Debug, Clone)]
pub struct VoiceProfile {
    /// BCP-47 locale, e.g. "vi-VN"
    pub locale: String,
    /// Named character voice, resolved to the service's gender tag
    pub voice: String,
    /// Speaking rate (1.0 is normal)
    pub speed: f32,
    /// Pitch offset in semitones
    pub pitch: f32,
    /// Vocal range; carried with the preset but not sent to the service
    pub range: f32,
}

impl VoiceProfile {
    /// Build a profile from a configured preset
    pub fn from_preset(locale: &str, preset: &VoicePreset) -> Self {
        Self {
            locale: locale.to_string(),
            voice: preset.voice.clone(),
            speed: preset.speed,
            pitch: preset.pitch,
            range: preset.range,
        }
    }
}

/// Per-call overrides of the player's voice profile
///
/// `voice`, `speed` and `pitch` are applied to the outgoing request. The
/// remaining fields are accepted so emotive presets can be passed through
/// whole, but the synthesis service has no parameters for them and they are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct VoiceOverrides {
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub pitch: Option<f32>,
    pub range: Option<f32>,
    pub joy: Option<f32>,
    pub anger: Option<f32>,
    pub sadness: Option<f32>,
}

/// Speech playback for one character voice
///
/// At most one playback runs per player: `start` holds `&mut self` for the
/// whole sequence, so a second call cannot race the first on the shared
/// pipeline. Use one player per voice to speak lines concurrently.
pub struct SpeechPlayer {
    profile: VoiceProfile,
    client: SynthesisClient,
    backend: Box<dyn AudioBackend>,
    ceiling: Duration,
}

impl SpeechPlayer {
    /// Create a player for a voice profile using the configured service
    pub fn new(profile: VoiceProfile, config: &Config) -> Result<Self> {
        let client = SynthesisClient::new(&config.base_url(), &config.api_key()?)?;
        Ok(Self {
            profile,
            client,
            backend: create_backend(),
            ceiling: Duration::from_millis(config.ceiling_ms()),
        })
    }

    /// Create a player from an explicit synthesis client
    ///
    /// Tests build their client against a mock endpoint.
    pub fn from_client(profile: VoiceProfile, client: SynthesisClient) -> Self {
        Self {
            profile,
            client,
            backend: create_backend(),
            ceiling: Duration::from_millis(DEFAULT_CEILING_MS),
        }
    }

    /// Replace the audio backend
    pub fn with_backend(mut self, backend: Box<dyn AudioBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Override the playback ceiling
    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// The player's voice profile
    pub fn profile(&self) -> &VoiceProfile {
        &self.profile
    }

    /// Speak a line with default gain and no overrides
    pub async fn speak(&mut self, text: &str, delay: Duration) -> Result<()> {
        self.start(text, delay, 1.0, &VoiceOverrides::default()).await
    }

    /// Synthesize and play one line of text
    ///
    /// `delay` is waited out after playback ends naturally, before the call
    /// returns; it is skipped when the ceiling cuts playback off. `volume` is
    /// the playback gain (1.0 is unity).
    ///
    /// Settles exactly once: success with no value, or the first error from
    /// the transport, the service, or the audio decode. No retry.
    pub async fn start(
        &mut self,
        text: &str,
        delay: Duration,
        volume: f32,
        overrides: &VoiceOverrides,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        self.backend.resume()?;

        let request = SynthesisRequest::build(&self.profile, text, overrides);
        let audio = self.client.synthesize(&request).await?;

        let playback = self.backend.play(&audio, volume)?;

        // Race natural completion against the ceiling. The first branch to win
        // settles the call; the loser is simply never polled again, so a late
        // ceiling cannot fire during the trailing delay and a late natural end
        // has nothing left to settle.
        let ceiling = tokio::time::sleep(self.ceiling);
        tokio::pin!(ceiling);

        loop {
            if playback.is_finished() {
                debug!("Playback finished naturally");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                break;
            }

            tokio::select! {
                _ = &mut ceiling => {
                    debug!("Playback ceiling {:?} reached, stopping", self.ceiling);
                    playback.stop();
                    break;
                }
                _ = tokio::time::sleep(END_POLL_INTERVAL) => {}
            }
        }

        Ok(())
    }

    /// Suspend the audio pipeline
    ///
    /// Idempotent; safe to call before any playback has started. Does not
    /// cancel an in-flight synthesis request.
    pub fn stop(&mut self) -> Result<()> {
        debug!("Suspending audio pipeline");
        self.backend.suspend()
    }
}
