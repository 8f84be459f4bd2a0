use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use super::wav;
use crate::config::RecognizerConfig;

/// Incremental recognizer fed with PCM chunks
///
/// Implemented by the Vosk backend; tests substitute `MockRecognizer` (via `mockall`).
#[cfg_attr(test, mockall::automock)]
pub trait Recognizer {
    /// Feed one chunk of 16-bit mono samples
    ///
    /// # Errors
    /// Returns error if the recognizer rejects the data
    fn accept_waveform(&mut self, samples: &[i16]) -> Result<(), TranscribeError>;

    /// Flush pending audio and return the aggregated text
    ///
    /// # Errors
    /// Returns error if the final result can't be produced
    fn final_text(&mut self) -> Result<String, TranscribeError>;
}

/// A loaded speech model that hands out recognizers
#[cfg_attr(test, mockall::automock)]
pub trait SpeechEngine {
    /// Create a recognizer for audio at `sample_rate`
    ///
    /// # Errors
    /// Returns error if the library can't create a recognizer
    fn recognizer(
        &self,
        sample_rate: u32,
        words: bool,
    ) -> Result<Box<dyn Recognizer>, TranscribeError>;
}

/// Errors that can occur while transcribing a file
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// Input path doesn't exist
    #[error("Audio file not found")]
    AudioNotFound,

    /// Model directory doesn't exist
    #[error("Model not found at {}", path.display())]
    ModelNotFound {
        /// Expected model directory
        path: PathBuf,
    },

    /// The recognition library refused the model
    #[error("failed to load model from {}: {reason}", path.display())]
    ModelLoad {
        /// Model directory
        path: PathBuf,
        /// Why loading failed
        reason: String,
    },

    /// Input isn't mono 16-bit integer PCM
    #[error("Audio file must be WAV format mono PCM.")]
    UnsupportedFormat,

    /// The library couldn't build a recognizer
    #[error("failed to create recognizer for {sample_rate} Hz audio")]
    RecognizerCreate {
        /// Sample rate of the input
        sample_rate: u32,
    },

    /// WAV container or sample decoding failed
    #[error("{0}")]
    Wav(#[from] hound::Error),

    /// Recognizer failed while consuming audio
    #[error("recognition failed: {0}")]
    Recognition(String),
}

impl TranscribeError {
    /// Whether the runner should exit non-zero
    ///
    /// Only a missing model directory qualifies. Everything else, including a
    /// model the library rejects, is reported as an error object with exit 0.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelNotFound { .. })
    }
}

/// Transcribes the WAV file at `audio_path` with the model at `model_path`
///
/// `load_engine` is only called once both paths exist. The WAV format is
/// checked before any recognizer is created.
///
/// # Errors
/// Returns error if a path is missing, the model can't be loaded, the file
/// isn't mono 16-bit PCM, or recognition fails
pub fn process_audio<E, F>(
    audio_path: &Path,
    model_path: &Path,
    load_engine: F,
    options: &RecognizerConfig,
) -> Result<String, TranscribeError>
where
    E: SpeechEngine,
    F: FnOnce(&Path) -> Result<E, TranscribeError>,
{
    let _span = tracing::debug_span!("transcription", audio = %audio_path.display()).entered();

    if !audio_path.exists() {
        tracing::warn!(path = %audio_path.display(), "audio file not found");
        return Err(TranscribeError::AudioNotFound);
    }

    if !model_path.exists() {
        tracing::error!(path = %model_path.display(), "model directory not found");
        return Err(TranscribeError::ModelNotFound {
            path: model_path.to_path_buf(),
        });
    }

    let engine = load_engine(model_path)?;

    let mut reader = wav::open_validated(audio_path)?;
    let spec = reader.spec();

    let mut recognizer = engine.recognizer(spec.sample_rate, options.words)?;

    let start = Instant::now();
    let chunks = wav::feed_chunks(&mut reader, options.chunk_frames.max(1), |chunk| {
        recognizer.accept_waveform(chunk)
    })?;
    let text = recognizer.final_text()?;

    tracing::info!(
        sample_rate = spec.sample_rate,
        chunks,
        text_len = text.len(),
        recognition_ms = start.elapsed().as_millis(),
        "transcription completed"
    );

    Ok(text)
}
