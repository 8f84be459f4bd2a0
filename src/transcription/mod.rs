/// Recognizer seams and the transcription pipeline
pub mod engine;
/// JSON transcript object
pub mod result;
/// Vosk-backed engine
#[cfg(feature = "vosk")]
pub mod vosk_engine;
/// WAV validation and chunked reading
pub mod wav;

pub use engine::{process_audio, Recognizer, SpeechEngine, TranscribeError};
pub use result::{Response, TranscriptResult};
#[cfg(feature = "vosk")]
pub use vosk_engine::VoskEngine;
