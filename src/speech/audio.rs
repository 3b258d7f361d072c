//! Audio output pipeline
//!
//! Wraps the device audio stack behind a small trait so the playback
//! sequencing can be exercised without a sound card. The production backend
//! decodes MP3 bytes with rodio and plays them on the default output device.
//!
//! The pipeline is thread-bound (the underlying device stream is not Send),
//! which matches the player's single-threaded sequencing model.

use crate::{NarratorError, Result};
use log::{debug, error};
use rodio::source::Source;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// One in-flight playback
///
/// Returned by [`AudioBackend::play`]; the player polls it for natural
/// completion and force-stops it when the ceiling elapses.
pub trait PlaybackHandle {
    /// Has the decoded audio run to its natural end?
    fn is_finished(&self) -> bool;

    /// Stop playback immediately and discard any queued audio
    fn stop(&self);

    /// Duration of the decoded audio, when the decoder knows it
    fn duration(&self) -> Option<Duration>;
}

/// Device audio pipeline boundary
///
/// All backends implement this to decode and play synthesized audio.
pub trait AudioBackend {
    /// Ensure the pipeline exists and is running
    ///
    /// Creates the output stream on first use and resumes a suspended
    /// pipeline; a running pipeline is left untouched.
    fn resume(&mut self) -> Result<()>;

    /// Suspend the pipeline if one exists
    ///
    /// Idempotent; a no-op before the pipeline has ever been created.
    fn suspend(&mut self) -> Result<()>;

    /// Decode `data` and begin playback immediately at the given gain
    ///
    /// Playback does not loop and runs at unit rate, starting at offset zero.
    fn play(&mut self, data: &[u8], volume: f32) -> Result<Box<dyn PlaybackHandle>>;
}

/// Create the default audio backend for this process
pub fn create_backend() -> Box<dyn AudioBackend> {
    debug!("Creating rodio audio backend");
    Box::new(RodioBackend::new())
}

/// rodio-based output backend
///
/// The output stream is opened lazily on first playback so constructing a
/// player never touches the audio device.
pub struct RodioBackend {
    /// Device output stream; kept alive for the backend's lifetime
    stream: Option<OutputStream>,

    /// Sink of the most recent playback, for suspend/resume
    current: Option<Arc<Sink>>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self {
            stream: None,
            current: None,
        }
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    fn resume(&mut self) -> Result<()> {
        if self.stream.is_none() {
            debug!("Opening default audio output stream");
            let stream = rodio::OutputStreamBuilder::open_default_stream().map_err(|e| {
                error!("Failed to open audio output: {}", e);
                NarratorError::Audio(format!("Failed to open audio output: {}", e))
            })?;
            self.stream = Some(stream);
        }

        if let Some(sink) = &self.current {
            if sink.is_paused() {
                debug!("Resuming suspended playback");
                sink.play();
            }
        }

        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        if let Some(sink) = &self.current {
            debug!("Suspending playback");
            sink.pause();
        }
        Ok(())
    }

    fn play(&mut self, data: &[u8], volume: f32) -> Result<Box<dyn PlaybackHandle>> {
        self.resume()?;

        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| NarratorError::Audio("Audio output stream unavailable".to_string()))?;

        let source = Decoder::new(Cursor::new(data.to_vec())).map_err(|e| {
            error!("Failed to decode audio: {}", e);
            NarratorError::Decode(format!("Failed to decode audio: {}", e))
        })?;
        let duration = source.total_duration();

        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(volume);
        sink.append(source);

        debug!(
            "Playback started ({} bytes, duration {:?})",
            data.len(),
            duration
        );

        let sink = Arc::new(sink);
        self.current = Some(Arc::clone(&sink));

        Ok(Box::new(RodioPlayback { sink, duration }))
    }
}

/// Handle over a rodio sink
struct RodioPlayback {
    sink: Arc<Sink>,
    duration: Option<Duration>,
}

impl PlaybackHandle for RodioPlayback {
    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}
