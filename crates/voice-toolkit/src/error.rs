use thiserror::Error;

/// Failures the voice worker can hit. None of these ever reach the caller of
/// `VoiceEngine::speak`; they are logged and the worker carries on.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("failed to initialize speech backend: {0}")]
    Init(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}
