use std::io;

use anyhow::Result;
use log::info;
use voice_toolkit::{SystemSynthesizer, VoiceEngine, VoiceEngineConfig};

use omos::managers::audio::MusicManager;
use omos::settings::AppSettings;
use omos::shell::Shell;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("OMOS_LOG", "info")).init();

    let settings = AppSettings::load();
    info!("starting OMOS (speech: {}, music: {})", settings.speech_enabled, settings.music_enabled);

    let music = MusicManager::new(settings.music_track.clone(), settings.music_volume);
    let voice = VoiceEngine::start(
        VoiceEngineConfig {
            queue_capacity: settings.speech_queue_capacity,
            ..VoiceEngineConfig::default()
        },
        SystemSynthesizer::factory(settings.speech_rate_wpm),
    );

    let shell = Shell::new(&settings, &voice, &music);
    let result = shell.run(&mut io::stdin().lock());

    // The shell shuts the voice engine down on a clean exit; drop covers the
    // error path.
    info!("OMOS exiting");
    result
}
