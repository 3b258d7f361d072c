//! Integration tests for speech playback sequencing
//!
//! The synthesis service is a local mock server; the audio device is a fake
//! backend with a scripted playback duration. Together they exercise the
//! whole start() sequence without a network or a sound card.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use narrator::speech::audio::{AudioBackend, PlaybackHandle};
use narrator::speech::{SpeechPlayer, SynthesisClient, VoiceOverrides, VoiceProfile};
use narrator::NarratorError;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Shared observation points for one fake backend
#[derive(Clone, Default)]
struct FakeState {
    played: Arc<Mutex<Vec<Vec<u8>>>>,
    volumes: Arc<Mutex<Vec<f32>>>,
    force_stopped: Arc<AtomicBool>,
    suspends: Arc<AtomicUsize>,
}

/// Audio backend whose playback "finishes" after a scripted duration
struct FakeBackend {
    duration: Duration,
    state: FakeState,
}

impl FakeBackend {
    fn new(duration: Duration) -> (Self, FakeState) {
        let state = FakeState::default();
        (
            Self {
                duration,
                state: state.clone(),
            },
            state,
        )
    }
}

impl AudioBackend for FakeBackend {
    fn resume(&mut self) -> narrator::Result<()> {
        Ok(())
    }

    fn suspend(&mut self) -> narrator::Result<()> {
        self.state.suspends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn play(&mut self, data: &[u8], volume: f32) -> narrator::Result<Box<dyn PlaybackHandle>> {
        self.state.played.lock().unwrap().push(data.to_vec());
        self.state.volumes.lock().unwrap().push(volume);
        Ok(Box::new(FakePlayback {
            started: Instant::now(),
            duration: self.duration,
            force_stopped: Arc::clone(&self.state.force_stopped),
        }))
    }
}

struct FakePlayback {
    started: Instant,
    duration: Duration,
    force_stopped: Arc<AtomicBool>,
}

impl PlaybackHandle for FakePlayback {
    fn is_finished(&self) -> bool {
        self.force_stopped.load(Ordering::SeqCst) || self.started.elapsed() >= self.duration
    }

    fn stop(&self) {
        self.force_stopped.store(true, Ordering::SeqCst);
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.duration)
    }
}

fn profile(locale: &str, voice: &str) -> VoiceProfile {
    VoiceProfile {
        locale: locale.to_string(),
        voice: voice.to_string(),
        speed: 1.0,
        pitch: 0.0,
        range: 1.0,
    }
}

fn player_for(
    server: &mockito::ServerGuard,
    profile: VoiceProfile,
    playback_duration: Duration,
) -> (SpeechPlayer, FakeState) {
    let client = SynthesisClient::new(&server.url(), "test-key").expect("client");
    let (backend, state) = FakeBackend::new(playback_duration);
    let player = SpeechPlayer::from_client(profile, client).with_backend(Box::new(backend));
    (player, state)
}

fn success_body(audio: &[u8]) -> String {
    json!({ "audioContent": BASE64.encode(audio) }).to_string()
}

#[tokio::test]
async fn test_success_scenario_vi_vn_taichi() {
    let mut server = mockito::Server::new_async().await;
    let audio = vec![0xffu8, 0xfb, 0x90, 0x00, 0x01, 0x02];

    let mock = server
        .mock("POST", "/text:synthesize")
        .match_query(mockito::Matcher::UrlEncoded(
            "key".into(),
            "test-key".into(),
        ))
        .match_body(mockito::Matcher::PartialJson(json!({
            "input": { "text": "xin chào" },
            "voice": { "languageCode": "vi-VN", "ssmlGender": "MALE" },
            "audioConfig": { "audioEncoding": "MP3" },
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body(&audio))
        .create_async()
        .await;

    let (mut player, state) = player_for(
        &server,
        profile("vi-VN", "taichi"),
        Duration::from_millis(20),
    );

    player
        .speak("xin chào", Duration::from_millis(100))
        .await
        .expect("playback should succeed");

    mock.assert_async().await;
    assert_eq!(state.played.lock().unwrap().as_slice(), &[audio]);
    assert_eq!(state.volumes.lock().unwrap().as_slice(), &[1.0]);
}

#[tokio::test]
async fn test_pt_br_is_requested_as_pt_pt() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/text:synthesize")
        .match_query(mockito::Matcher::Any)
        .match_body(mockito::Matcher::PartialJson(json!({
            "voice": { "languageCode": "pt-PT" },
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body(&[1, 2, 3]))
        .create_async()
        .await;

    let (mut player, _state) = player_for(
        &server,
        profile("pt-BR", "hiroshi"),
        Duration::from_millis(10),
    );

    player.speak("olá", Duration::ZERO).await.expect("playback");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_override_voice_changes_gender_tag() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/text:synthesize")
        .match_query(mockito::Matcher::Any)
        .match_body(mockito::Matcher::PartialJson(json!({
            "voice": { "ssmlGender": "FEMALE" },
            "audioConfig": { "speakingRate": 0.75 },
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body(&[9, 9, 9]))
        .create_async()
        .await;

    let (mut player, _state) = player_for(
        &server,
        profile("vi-VN", "taichi"),
        Duration::from_millis(10),
    );

    let overrides = VoiceOverrides {
        voice: Some("nozomi".to_string()),
        speed: Some(0.75),
        ..VoiceOverrides::default()
    };
    player
        .start("chào", Duration::ZERO, 1.0, &overrides)
        .await
        .expect("playback");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_failure_propagates_and_plays_nothing() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/text:synthesize")
        .match_query(mockito::Matcher::Any)
        .with_status(403)
        .with_body("API key not valid")
        .create_async()
        .await;

    let (mut player, state) = player_for(
        &server,
        profile("vi-VN", "taichi"),
        Duration::from_millis(10),
    );

    let result = player.speak("xin chào", Duration::ZERO).await;
    match result {
        Err(NarratorError::Service { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("API key"));
        }
        other => panic!("Expected service error, got {:?}", other.map(|_| ())),
    }

    assert!(state.played.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_audio_payload_propagates() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/text:synthesize")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "audioContent": "!!! not base64 !!!" }).to_string())
        .create_async()
        .await;

    let (mut player, state) = player_for(
        &server,
        profile("vi-VN", "taichi"),
        Duration::from_millis(10),
    );

    let result = player.speak("xin chào", Duration::ZERO).await;
    assert!(matches!(result, Err(NarratorError::MalformedAudio(_))));
    assert!(state.played.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    // Nothing listens here; the connection is refused
    let client = SynthesisClient::new("http://127.0.0.1:1", "test-key").expect("client");
    let (backend, state) = FakeBackend::new(Duration::from_millis(10));
    let mut player =
        SpeechPlayer::from_client(profile("vi-VN", "taichi"), client).with_backend(Box::new(backend));

    let result = player.speak("xin chào", Duration::ZERO).await;
    assert!(matches!(result, Err(NarratorError::Transport(_))));
    assert!(state.played.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_natural_end_waits_out_the_delay() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/text:synthesize")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body(&[1, 2, 3]))
        .create_async()
        .await;

    let delay = Duration::from_millis(300);
    let (mut player, state) = player_for(
        &server,
        profile("vi-VN", "taichi"),
        Duration::from_millis(30),
    );

    let started = Instant::now();
    player.speak("xin chào", delay).await.expect("playback");
    let elapsed = started.elapsed();

    // Playback ended naturally, so the delay ran in full and nothing was
    // force-stopped.
    assert!(elapsed >= delay, "returned after {:?}", elapsed);
    assert!(!state.force_stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_ceiling_stops_playback_without_delay() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/text:synthesize")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body(&[1, 2, 3]))
        .create_async()
        .await;

    let ceiling = Duration::from_millis(250);
    let delay = Duration::from_millis(500);
    let client = SynthesisClient::new(&server.url(), "test-key").expect("client");
    let (backend, state) = FakeBackend::new(Duration::from_secs(60));
    let mut player = SpeechPlayer::from_client(profile("vi-VN", "taichi"), client)
        .with_backend(Box::new(backend))
        .with_ceiling(ceiling);

    let started = Instant::now();
    player.speak("xin chào", delay).await.expect("playback");
    let elapsed = started.elapsed();

    // The ceiling cut playback off and settled immediately: no trailing delay.
    assert!(state.force_stopped.load(Ordering::SeqCst));
    assert!(elapsed >= ceiling, "returned after {:?}", elapsed);
    assert!(
        elapsed < ceiling + delay,
        "delay should not apply on the ceiling path, returned after {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_stop_suspends_the_pipeline() {
    let client = SynthesisClient::new("http://127.0.0.1:1", "test-key").expect("client");
    let (backend, state) = FakeBackend::new(Duration::from_millis(10));
    let mut player =
        SpeechPlayer::from_client(profile("vi-VN", "taichi"), client).with_backend(Box::new(backend));

    // Safe before any playback, and idempotent
    player.stop().expect("stop");
    player.stop().expect("stop");
    assert_eq!(state.suspends.load(Ordering::SeqCst), 2);
}
