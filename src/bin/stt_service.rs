//! Transcribes a mono 16-bit PCM WAV file and prints a JSON object.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use vosk_stt::config::{self, Config};
use vosk_stt::telemetry;
use vosk_stt::transcription::{self, vosk_engine, Response, VoskEngine};

const PROGRAM: &str = "stt-service";

#[derive(Parser, Debug)]
#[command(name = PROGRAM, version, about = "Transcribe a WAV file to JSON", long_about = None)]
struct Args {
    /// Mono 16-bit PCM WAV file
    audio: Option<PathBuf>,

    /// Config file (defaults to stt.toml next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model directory (overrides the configured one)
    #[arg(long)]
    model: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(audio) = args.audio.as_deref() else {
        return emit(&Response::usage(PROGRAM));
    };

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return emit(&Response::setup_failure(format!("{e:#}"))),
    };

    if let Err(e) = telemetry::init(&config.telemetry) {
        return emit(&Response::setup_failure(format!("{e:#}")));
    }
    vosk_engine::silence_library_logs();

    let model_path = match args.model {
        Some(path) => Ok(path),
        None => config::base_dir().and_then(|base| config.model_path(&base)),
    };
    let model_path = match model_path {
        Ok(path) => path,
        Err(e) => return emit(&Response::setup_failure(format!("{e:#}"))),
    };

    let outcome =
        transcription::process_audio(audio, &model_path, VoskEngine::load, &config.recognizer);
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, fatal = e.is_fatal(), "transcription failed");
    }

    emit(&Response::from_outcome(outcome))
}

fn emit(response: &Response) -> ExitCode {
    match response.result.write_to(io::stdout().lock()) {
        Ok(()) => ExitCode::from(response.exit_code),
        Err(e) => {
            tracing::error!(error = %e, "failed to write result to stdout");
            ExitCode::FAILURE
        }
    }
}
