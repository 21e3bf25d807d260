use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{info, warn};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

/// Background music over the default output device.
///
/// A missing audio backend or a missing track file degrades every operation
/// to a logged no-op; music is decoration, not a dependency.
pub struct MusicManager {
    track_path: PathBuf,
    volume: Mutex<f32>,
    /// Bumped by every play/stop/set_volume; an in-flight fade thread bails
    /// out as soon as its generation is stale, so a fresh track is never
    /// cleared by an old fade.
    fade_generation: Arc<AtomicU64>,
    output: Option<Output>,
}

struct Output {
    // Kept alive for the lifetime of the manager; dropping it silences the sink.
    _stream: OutputStream,
    sink: Arc<Sink>,
}

impl MusicManager {
    pub fn new(track_path: PathBuf, volume: f32) -> Self {
        let output = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => {
                let sink = Arc::new(Sink::connect_new(stream.mixer()));
                Some(Output {
                    _stream: stream,
                    sink,
                })
            }
            Err(e) => {
                warn!("audio output unavailable: {e}; background music disabled");
                None
            }
        };

        Self {
            track_path,
            volume: Mutex::new(volume.clamp(0.0, 1.0)),
            fade_generation: Arc::new(AtomicU64::new(0)),
            output,
        }
    }

    fn cancel_pending_fade(&self) {
        self.fade_generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Starts the configured track, looping by default. Replaces whatever
    /// was already playing, including a fade in progress.
    pub fn play(&self, looped: bool) {
        self.cancel_pending_fade();
        let Some(output) = &self.output else { return };
        if !self.track_path.exists() {
            warn!("background track missing at {}", self.track_path.display());
            return;
        }

        let file = match File::open(&self.track_path) {
            Ok(f) => f,
            Err(e) => {
                warn!("failed to open {}: {}", self.track_path.display(), e);
                return;
            }
        };
        let source = match Decoder::new(BufReader::new(file)) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to decode {}: {}", self.track_path.display(), e);
                return;
            }
        };

        output.sink.clear();
        output.sink.set_volume(*self.volume.lock().unwrap());
        if looped {
            output.sink.append(source.repeat_infinite());
        } else {
            output.sink.append(source);
        }
        output.sink.play();
        info!("background music started ({})", self.track_path.display());
    }

    /// Ramps the sink volume down over `duration` on a helper thread, then
    /// stops playback. The configured volume is restored for the next play.
    /// A later play, stop, or volume change supersedes the fade.
    pub fn fade_out(&self, duration: Duration) {
        let Some(output) = &self.output else { return };
        if !self.is_active() {
            return;
        }

        let sink = output.sink.clone();
        let start_volume = sink.volume();
        let restore_volume = *self.volume.lock().unwrap();
        let generation = self.fade_generation.fetch_add(1, Ordering::AcqRel) + 1;
        let live_generation = self.fade_generation.clone();
        thread::spawn(move || {
            const STEPS: u32 = 20;
            let step_pause = duration / STEPS;
            for step in (0..STEPS).rev() {
                if live_generation.load(Ordering::Acquire) != generation {
                    return;
                }
                sink.set_volume(start_volume * step as f32 / STEPS as f32);
                thread::sleep(step_pause);
            }
            if live_generation.load(Ordering::Acquire) != generation {
                return;
            }
            sink.clear();
            sink.set_volume(restore_volume);
        });
    }

    pub fn stop(&self) {
        self.cancel_pending_fade();
        if let Some(output) = &self.output {
            output.sink.clear();
        }
    }

    /// Sets the music volume, clamped to 0.0..=1.0.
    pub fn set_volume(&self, volume: f32) {
        self.cancel_pending_fade();
        let value = volume.clamp(0.0, 1.0);
        *self.volume.lock().unwrap() = value;
        if let Some(output) = &self.output {
            output.sink.set_volume(value);
        }
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    pub fn is_active(&self) -> bool {
        self.output
            .as_ref()
            .map(|o| !o.sink.empty() && !o.sink.is_paused())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These run with or without a real audio device; every operation must
    // degrade to a no-op instead of panicking.

    #[test]
    fn test_missing_track_never_panics() {
        let manager = MusicManager::new(PathBuf::from("/nonexistent/track.mp3"), 0.35);
        manager.play(true);
        assert!(!manager.is_active());
        manager.fade_out(Duration::from_millis(10));
        manager.stop();
    }

    #[test]
    fn test_play_stop_and_volume_supersede_a_fade() {
        let manager = MusicManager::new(PathBuf::from("/nonexistent/track.mp3"), 0.35);
        let before = manager.fade_generation.load(Ordering::Acquire);

        // Each of these must advance the generation so a fade thread started
        // earlier sees a stale generation and bails before clearing the sink.
        manager.play(true);
        manager.set_volume(0.5);
        manager.stop();

        let after = manager.fade_generation.load(Ordering::Acquire);
        assert_eq!(after, before + 3);
    }

    #[test]
    fn test_volume_is_clamped() {
        let manager = MusicManager::new(PathBuf::from("/nonexistent/track.mp3"), 2.0);
        assert!((manager.volume() - 1.0).abs() < f32::EPSILON);

        manager.set_volume(-0.5);
        assert!(manager.volume().abs() < f32::EPSILON);

        manager.set_volume(0.4);
        assert!((manager.volume() - 0.4).abs() < f32::EPSILON);
    }
}
