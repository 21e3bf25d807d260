//! Line-oriented front end: banner, sign-in, then the dashboard loop.
//!
//! The shell owns no state of its own; it only wires user input to the
//! responder, the voice engine, and the music manager.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use log::info;
use voice_toolkit::VoiceEngine;

use crate::assistant;
use crate::managers::audio::MusicManager;
use crate::settings::AppSettings;

const BANNER: &str = "\
  ___  __  __  ___  ___
 / _ \\|  \\/  |/ _ \\/ __|
| (_) | |\\/| | (_) \\__ \\
 \\___/|_|  |_|\\___/|___/  desktop assistant
";

const SHUTDOWN_FADE: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Exit,
    Help,
    MusicOn,
    MusicOff,
    /// Volume as a percentage, already validated to 0..=100.
    Volume(u8),
    Ask(String),
}

/// Maps one input line onto a dashboard action. Anything that is not a
/// recognized command is a prompt for the assistant.
pub fn parse_command(line: &str) -> ShellCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellCommand::Empty;
    }

    match trimmed.to_lowercase().as_str() {
        "exit" | "quit" | "shutdown" => return ShellCommand::Exit,
        "help" | "?" => return ShellCommand::Help,
        "music on" => return ShellCommand::MusicOn,
        "music off" => return ShellCommand::MusicOff,
        _ => {}
    }

    if let Some(rest) = trimmed.to_lowercase().strip_prefix("volume ") {
        if let Ok(percent) = rest.trim().parse::<u8>() {
            if percent <= 100 {
                return ShellCommand::Volume(percent);
            }
        }
    }

    ShellCommand::Ask(trimmed.to_string())
}

fn print_help() {
    println!("Commands:");
    println!("  help            show this message");
    println!("  music on/off    start or fade out the background track");
    println!("  volume <0-100>  set the music volume");
    println!("  status          quick system summary");
    println!("  exit            shut OMOS down");
    println!("Anything else is sent to the assistant.");
}

pub struct Shell<'a> {
    settings: &'a AppSettings,
    voice: &'a VoiceEngine,
    music: &'a MusicManager,
}

impl<'a> Shell<'a> {
    pub fn new(settings: &'a AppSettings, voice: &'a VoiceEngine, music: &'a MusicManager) -> Self {
        Self {
            settings,
            voice,
            music,
        }
    }

    fn say(&self, text: &str) {
        if self.settings.speech_enabled {
            self.voice.speak(text);
        }
    }

    fn sign_in(&self, input: &mut impl BufRead) -> Result<bool> {
        println!("{BANNER}");
        self.say("Hello, please sign in to OMOS.");
        print!("Enter password or press Enter: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // stdin closed before sign-in; nothing to run
            return Ok(false);
        }
        println!("Access granted.");
        self.say("Access granted. Welcome aboard.");
        Ok(true)
    }

    /// Runs sign-in and the dashboard loop until exit or end of input.
    pub fn run(&self, input: &mut impl BufRead) -> Result<()> {
        if !self.sign_in(input)? {
            return Ok(());
        }

        if self.settings.music_enabled {
            self.music.play(true);
        }
        println!("Type 'help' for commands.");

        loop {
            print!("omos> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            match parse_command(&line) {
                ShellCommand::Empty => {}
                ShellCommand::Exit => break,
                ShellCommand::Help => print_help(),
                ShellCommand::MusicOn => self.music.play(true),
                ShellCommand::MusicOff => self.music.fade_out(SHUTDOWN_FADE),
                ShellCommand::Volume(percent) => {
                    self.music.set_volume(percent as f32 / 100.0);
                    println!("Music volume set to {percent}%.");
                }
                ShellCommand::Ask(prompt) => {
                    let reply = assistant::answer(&prompt);
                    println!("OMOS: {reply}");
                    self.say(&reply);
                }
            }
        }

        info!("dashboard exited; shutting down");
        self.music.fade_out(SHUTDOWN_FADE);
        self.voice.shutdown();
        // Let the fade finish before the output stream is torn down.
        std::thread::sleep(SHUTDOWN_FADE + Duration::from_millis(100));
        Ok(())
    }
}
