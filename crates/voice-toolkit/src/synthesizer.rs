use std::thread;
use std::time::Duration;

use log::{debug, info};
use tts::Tts;

use crate::error::SynthesisError;

/// A backend that can render one utterance and block until playback is done.
///
/// The worker thread owns the backend exclusively, so implementations only
/// need `Send`, not `Sync`.
pub trait SpeechSynthesizer: Send {
    fn speak(&mut self, text: &str) -> Result<(), SynthesisError>;
}

/// Builds the backend on the worker thread, exactly once.
pub type SynthesizerFactory =
    Box<dyn FnOnce() -> Result<Box<dyn SpeechSynthesizer>, SynthesisError> + Send>;

/// Reference speaking rate in words per minute; backend rates are scaled
/// relative to this.
const NOMINAL_WPM: f32 = 190.0;

/// Playback poll tick while an utterance is rendering.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// System speech through the `tts` crate (speech-dispatcher on Linux, SAPI
/// on Windows, AVFoundation on macOS).
///
/// If no platform backend can be opened, construction fails and the engine
/// degrades to a logged no-op speaker.
pub struct SystemSynthesizer {
    tts: Tts,
    can_poll: bool,
}

impl SystemSynthesizer {
    /// Opens the platform engine and applies the speaking rate. `rate_wpm`
    /// is in words per minute (the usual comfortable default is ~190).
    pub fn new(rate_wpm: u32) -> Result<Self, SynthesisError> {
        let mut tts = Tts::default().map_err(|e| SynthesisError::Init(e.to_string()))?;
        let features = tts.supported_features();

        if features.rate {
            // The backend's rate scale is its own; map wpm onto it around
            // the backend's normal rate.
            let scaled = tts.normal_rate() * rate_wpm as f32 / NOMINAL_WPM;
            let rate = scaled.clamp(tts.min_rate(), tts.max_rate());
            if let Err(e) = tts.set_rate(rate) {
                debug!("could not set speaking rate: {e}");
            }
        }
        if !features.is_speaking {
            info!("speech backend cannot report playback state; utterances will not be awaited");
        }

        Ok(Self {
            tts,
            can_poll: features.is_speaking,
        })
    }

    /// Returns a factory suitable for `VoiceEngine::start`.
    pub fn factory(rate_wpm: u32) -> SynthesizerFactory {
        Box::new(move || Ok(Box::new(Self::new(rate_wpm)?) as Box<dyn SpeechSynthesizer>))
    }
}

impl SpeechSynthesizer for SystemSynthesizer {
    fn speak(&mut self, text: &str) -> Result<(), SynthesisError> {
        debug!("synthesizing {} chars", text.len());
        self.tts
            .speak(text, false)
            .map_err(|e| SynthesisError::Synthesis(e.to_string()))?;

        if !self.can_poll {
            return Ok(());
        }

        // The backend may take a moment to pick the utterance up; give it
        // one tick before trusting is_speaking.
        thread::sleep(POLL_INTERVAL);
        loop {
            match self.tts.is_speaking() {
                Ok(true) => thread::sleep(POLL_INTERVAL),
                Ok(false) => return Ok(()),
                Err(e) => return Err(SynthesisError::Synthesis(e.to_string())),
            }
        }
    }
}
