//! Speech synthesis system

pub mod audio;
pub mod client;
pub mod player;
pub mod request;
pub mod voice;

pub use audio::{create_backend, AudioBackend, PlaybackHandle};
pub use client::SynthesisClient;
pub use player::{SpeechPlayer, VoiceOverrides, VoiceProfile};
pub use voice::Gender;
