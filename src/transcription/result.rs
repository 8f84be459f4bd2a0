use serde::Serialize;
use std::io::Write;

use super::TranscribeError;

/// JSON object printed by the runner: exactly one of `transcript` or `error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptResult {
    /// Recognized text, possibly empty
    Transcript(String),
    /// Human-readable failure message
    Error(String),
}

impl TranscriptResult {
    /// Usage error for a missing audio argument
    #[must_use]
    pub fn usage(program: &str) -> Self {
        Self::Error(format!("Usage: {program} <audio_file_path>"))
    }

    /// Whether this is an error object
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Write the object as a single JSON line
    ///
    /// # Errors
    /// Returns error if the writer fails
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        serde_json::to_writer(&mut out, self)?;
        writeln!(out)?;
        out.flush()
    }
}

impl From<Result<String, TranscribeError>> for TranscriptResult {
    fn from(result: Result<String, TranscribeError>) -> Self {
        match result {
            Ok(text) => Self::Transcript(text),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

/// What the runner prints and the status it exits with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Object written to stdout
    pub result: TranscriptResult,
    /// Process exit status
    pub exit_code: u8,
}

impl Response {
    /// Missing audio argument: usage error, exit 1
    #[must_use]
    pub fn usage(program: &str) -> Self {
        Self {
            result: TranscriptResult::usage(program),
            exit_code: 1,
        }
    }

    /// Setup failure before transcription started (config, logging), exit 1
    #[must_use]
    pub fn setup_failure(message: String) -> Self {
        Self {
            result: TranscriptResult::Error(message),
            exit_code: 1,
        }
    }

    /// Finished run: exit 1 only when the model directory is missing
    #[must_use]
    pub fn from_outcome(outcome: Result<String, TranscribeError>) -> Self {
        let exit_code = match &outcome {
            Err(e) if e.is_fatal() => 1,
            _ => 0,
        };
        Self {
            result: TranscriptResult::from(outcome),
            exit_code,
        }
    }
}
