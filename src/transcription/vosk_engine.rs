use std::path::Path;
use vosk::{CompleteResult, LogLevel, Model};

use super::{Recognizer, SpeechEngine, TranscribeError};

/// Vosk model loaded from a model directory
pub struct VoskEngine {
    model: Model,
}

impl VoskEngine {
    /// Loads the Vosk model at `model_path`
    ///
    /// # Errors
    /// Returns `ModelLoad` if the path isn't UTF-8 or Vosk rejects the directory
    pub fn load(model_path: &Path) -> Result<Self, TranscribeError> {
        let path_str = model_path
            .to_str()
            .ok_or_else(|| TranscribeError::ModelLoad {
                path: model_path.to_path_buf(),
                reason: "model path contains invalid UTF-8".to_owned(),
            })?;

        tracing::info!(path = %model_path.display(), "loading vosk model");

        let model = Model::new(path_str).ok_or_else(|| TranscribeError::ModelLoad {
            path: model_path.to_path_buf(),
            reason: "vosk could not load the model directory".to_owned(),
        })?;

        tracing::info!("vosk model loaded successfully");

        Ok(Self { model })
    }
}

impl SpeechEngine for VoskEngine {
    fn recognizer(
        &self,
        sample_rate: u32,
        words: bool,
    ) -> Result<Box<dyn Recognizer>, TranscribeError> {
        #[allow(clippy::cast_precision_loss)] // WAV sample rates are far below f32's exact range
        let rate = sample_rate as f32;

        let mut recognizer = vosk::Recognizer::new(&self.model, rate)
            .ok_or(TranscribeError::RecognizerCreate { sample_rate })?;
        recognizer.set_words(words);

        Ok(Box::new(VoskRecognizer(recognizer)))
    }
}

struct VoskRecognizer(vosk::Recognizer);

impl Recognizer for VoskRecognizer {
    fn accept_waveform(&mut self, samples: &[i16]) -> Result<(), TranscribeError> {
        self.0
            .accept_waveform(samples)
            .map(|_| ())
            .map_err(|e| TranscribeError::Recognition(format!("{e:?}")))
    }

    fn final_text(&mut self) -> Result<String, TranscribeError> {
        let text = match self.0.final_result() {
            CompleteResult::Single(single) => single.text.to_owned(),
            CompleteResult::Multiple(multiple) => multiple
                .alternatives
                .first()
                .map(|alternative| alternative.text.to_owned())
                .unwrap_or_default(),
        };
        Ok(text)
    }
}

/// Silences Vosk's own stderr logging
pub fn silence_library_logs() {
    vosk::set_log_level(LogLevel::Error);
}
