//! Queued text-to-speech for OMOS.
//!
//! Components:
//! - `synthesizer`: the blocking synthesis capability and the system backend
//! - `engine`: the single-threaded queue worker that owns the backend

pub mod engine;
pub mod error;
pub mod synthesizer;

pub use engine::{VoiceEngine, VoiceEngineConfig};
pub use error::SynthesisError;
pub use synthesizer::{SpeechSynthesizer, SynthesizerFactory, SystemSynthesizer};
