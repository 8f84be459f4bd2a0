use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up next to the executable when no path is given
pub const CONFIG_FILE_NAME: &str = "stt.toml";

/// Largest accepted `recognizer.chunk_frames`
pub const MAX_CHUNK_FRAMES: usize = 1 << 20;

/// Runtime configuration shared by the fetcher and the runner
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Model archive location and on-disk layout
    pub model: ModelConfig,
    /// Recognizer feeding options
    pub recognizer: RecognizerConfig,
    /// Logging options
    pub telemetry: TelemetryConfig,
}

/// Where the model comes from and where it lives
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Remote zip archive
    pub url: String,
    /// Canonical model directory, relative to the base directory unless absolute
    pub dir: String,
    /// Temporary archive file name
    pub archive: String,
    /// Folder the archive is expected to expand into
    pub extracted_folder: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: "https://alphacephei.com/vosk/models/vosk-model-ar-mgb2-0.4.zip".to_owned(),
            dir: "model".to_owned(),
            archive: "model.zip".to_owned(),
            extracted_folder: "vosk-model-ar-mgb2-0.4".to_owned(),
        }
    }
}

/// How audio is handed to the recognizer
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Frames per chunk passed to the recognizer
    pub chunk_frames: usize,
    /// Enable word-level timing in recognizer results
    pub words: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            chunk_frames: 4000,
            words: true,
        }
    }
}

/// Logging destination and verbosity
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Log file; stderr when unset
    pub log_path: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            log_path: None,
        }
    }
}

impl Config {
    /// Load config from `path`, or from `stt.toml` next to the executable.
    ///
    /// An explicit path must exist. Without one, a missing file yields defaults.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed, or fails validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = base_dir()?.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::parse(&contents)
    }

    /// Parse a TOML document; absent keys fall back to defaults
    ///
    /// # Errors
    /// Returns error if the document is not valid TOML for this schema
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config TOML")
    }

    /// Reject values the runner can't work with
    ///
    /// # Errors
    /// Returns error if `recognizer.chunk_frames` is zero or above `MAX_CHUNK_FRAMES`
    pub fn validate(&self) -> Result<()> {
        let chunk_frames = self.recognizer.chunk_frames;
        if chunk_frames == 0 {
            anyhow::bail!("recognizer.chunk_frames must be > 0");
        }
        if chunk_frames > MAX_CHUNK_FRAMES {
            anyhow::bail!(
                "recognizer.chunk_frames must be <= {MAX_CHUNK_FRAMES} (got {chunk_frames})"
            );
        }
        Ok(())
    }

    /// Canonical model directory
    ///
    /// # Errors
    /// Returns error if `~` can't be expanded
    pub fn model_path(&self, base: &Path) -> Result<PathBuf> {
        resolve(base, &self.model.dir)
    }

    /// Temporary archive location
    ///
    /// # Errors
    /// Returns error if `~` can't be expanded
    pub fn archive_path(&self, base: &Path) -> Result<PathBuf> {
        resolve(base, &self.model.archive)
    }

    /// Folder the archive expands into, inside the base directory
    #[must_use]
    pub fn extracted_path(&self, base: &Path) -> PathBuf {
        base.join(&self.model.extracted_folder)
    }

    /// Expand ~ in paths to home directory
    ///
    /// # Errors
    /// Returns error if the path starts with `~/` and `HOME` is unset
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}

/// Directory containing the running executable
///
/// # Errors
/// Returns error if the executable path can't be determined
pub fn base_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("failed to locate current executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable has no parent directory")
}

fn resolve(base: &Path, entry: &str) -> Result<PathBuf> {
    let path = Config::expand_path(entry)?;
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model.dir, "model");
        assert_eq!(config.model.archive, "model.zip");
        assert_eq!(config.model.extracted_folder, "vosk-model-ar-mgb2-0.4");
        assert!(config.model.url.ends_with("vosk-model-ar-mgb2-0.4.zip"));
        assert_eq!(config.recognizer.chunk_frames, 4000);
        assert!(config.recognizer.words);
        assert_eq!(config.telemetry.level, "info");
        assert!(config.telemetry.log_path.is_none());
    }

    #[test]
    fn test_parse_empty_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_partial_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[model]
url = "http://localhost:8080/small.zip"

[recognizer]
chunk_frames = 8000
"#,
        )
        .unwrap();

        assert_eq!(config.model.url, "http://localhost:8080/small.zip");
        assert_eq!(config.model.dir, "model");
        assert_eq!(config.recognizer.chunk_frames, 8000);
        assert!(config.recognizer.words);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("[model\nurl = ");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_chunk_frames() {
        let mut config = Config::default();
        config.recognizer.chunk_frames = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chunk_frames must be > 0"));
    }

    #[test]
    fn test_validate_chunk_frames_upper_bound() {
        let mut config = Config::default();
        config.recognizer.chunk_frames = MAX_CHUNK_FRAMES;
        assert!(config.validate().is_ok());

        config.recognizer.chunk_frames = MAX_CHUNK_FRAMES + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chunk_frames must be <="));
    }

    #[test]
    fn test_load_rejects_oversized_chunk_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.toml");
        fs::write(
            &path,
            "[recognizer]\nchunk_frames = 18446744073709551615\n",
        )
        .unwrap();

        let result = Config::load(Some(&path));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[telemetry]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.telemetry.level, "debug");
    }

    #[test]
    fn test_load_explicit_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_path_invalid_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[recognizer]\nchunk_frames = 0\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_paths_resolve_against_base() {
        let config = Config::default();
        let base = Path::new("/srv/stt");
        assert_eq!(config.model_path(base).unwrap(), base.join("model"));
        assert_eq!(config.archive_path(base).unwrap(), base.join("model.zip"));
        assert_eq!(
            config.extracted_path(base),
            base.join("vosk-model-ar-mgb2-0.4")
        );
    }

    #[test]
    fn test_absolute_model_dir_is_kept() {
        let mut config = Config::default();
        config.model.dir = "/opt/models/ar".to_owned();
        let path = config.model_path(Path::new("/srv/stt")).unwrap();
        assert_eq!(path, PathBuf::from("/opt/models/ar"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let home = std::env::var("HOME").expect("HOME not set");
        let result = Config::expand_path("~/models/ar").unwrap();
        assert_eq!(result, PathBuf::from(home).join("models/ar"));
    }

    #[test]
    fn test_expand_path_relative() {
        let result = Config::expand_path("models/ar").unwrap();
        assert_eq!(result, PathBuf::from("models/ar"));
    }

    #[test]
    fn test_base_dir_exists() {
        let base = base_dir().unwrap();
        assert!(base.is_dir());
    }
}
