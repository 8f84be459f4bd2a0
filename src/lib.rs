//! vosk-stt - Vosk model fetcher and WAV-to-JSON transcription runner
//!
//! The library backs two binaries: `setup-model` installs the model directory,
//! `stt-service` transcribes a WAV file against it.

/// Configuration management
pub mod config;
/// Model archive download and installation
pub mod fetch;
/// Logging setup
pub mod telemetry;
/// WAV transcription pipeline
pub mod transcription;
