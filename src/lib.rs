//! narrator - spoken audio for character lines
//!
//! A small playback client for the Google Cloud Text-to-Speech API.
//! One [`speech::SpeechPlayer`] holds one character's voice profile and turns a
//! line of text into audio on the local output device.

pub mod config;
pub mod error;
pub mod speech;

pub use error::{NarratorError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "narrator";
