/// HTTP archive download
pub mod download;
/// Zip extraction and directory diagnostics
pub mod extract;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;

pub use download::{download_archive, HttpArchiveSource};
pub use extract::{extract_archive, list_dir};

/// Source of the model archive (enables testing without network access)
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveSource {
    /// Write the archive found at `url` to `dest`
    ///
    /// # Errors
    /// Returns error if the archive can't be retrieved or written
    fn fetch(&self, url: &str, dest: &Path) -> anyhow::Result<()>;
}

/// What `ensure_model` found or did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Model directory was already there, nothing fetched
    AlreadyPresent,
    /// Archive downloaded, extracted and renamed into place
    Installed,
    /// Archive extracted but the expected folder wasn't in it
    MissingExtractedFolder {
        /// Base directory listing after extraction
        contents: Vec<String>,
    },
}

/// Errors that abort model installation
#[derive(Debug, Error)]
pub enum FetchError {
    /// Paths couldn't be resolved from configuration
    #[error("invalid model configuration: {0}")]
    Config(anyhow::Error),

    /// Archive download failed
    #[error("failed to download model from {url}: {source}")]
    Download {
        /// Archive URL
        url: String,
        /// Underlying error
        source: anyhow::Error,
    },

    /// Archive extraction failed
    #[error("failed to extract model archive {}: {source}", archive.display())]
    Extract {
        /// Archive path
        archive: PathBuf,
        /// Underlying error
        source: anyhow::Error,
    },

    /// Extracted folder couldn't be moved to the model directory
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Install {
        /// Extracted folder
        from: PathBuf,
        /// Canonical model directory
        to: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Ensures the model directory exists under `base`, fetching it if needed
///
/// The temporary archive is removed on every path once a download was attempted.
///
/// # Errors
/// Returns error if the download, extraction or final rename fails
pub fn ensure_model(
    config: &Config,
    base: &Path,
    source: &dyn ArchiveSource,
) -> Result<FetchOutcome, FetchError> {
    let model_path = config.model_path(base).map_err(FetchError::Config)?;

    if model_path.exists() {
        tracing::info!(
            path = %model_path.display(),
            "model directory already exists, skipping download"
        );
        return Ok(FetchOutcome::AlreadyPresent);
    }

    let archive_path = config.archive_path(base).map_err(FetchError::Config)?;

    tracing::info!(
        path = %model_path.display(),
        "model directory not found, starting download"
    );

    let result = install(config, base, &model_path, &archive_path, source);
    remove_archive(&archive_path);
    result
}

fn install(
    config: &Config,
    base: &Path,
    model_path: &Path,
    archive_path: &Path,
    source: &dyn ArchiveSource,
) -> Result<FetchOutcome, FetchError> {
    let url = &config.model.url;
    source
        .fetch(url, archive_path)
        .map_err(|source| FetchError::Download {
            url: url.clone(),
            source,
        })?;

    extract_archive(archive_path, base).map_err(|source| FetchError::Extract {
        archive: archive_path.to_path_buf(),
        source,
    })?;

    let extracted = config.extracted_path(base);
    if !extracted.exists() {
        let contents = list_dir(base).unwrap_or_default();
        tracing::error!(
            expected = %extracted.display(),
            contents = ?contents,
            "expected extracted folder not found"
        );
        return Ok(FetchOutcome::MissingExtractedFolder { contents });
    }

    let install_err = |source| FetchError::Install {
        from: extracted.clone(),
        to: model_path.to_path_buf(),
        source,
    };
    if let Some(parent) = model_path.parent() {
        fs::create_dir_all(parent).map_err(install_err)?;
    }
    fs::rename(&extracted, model_path).map_err(install_err)?;

    tracing::info!(path = %model_path.display(), "model installed");
    Ok(FetchOutcome::Installed)
}

fn remove_archive(archive_path: &Path) {
    if !archive_path.exists() {
        return;
    }
    match fs::remove_file(archive_path) {
        Ok(()) => tracing::debug!(path = %archive_path.display(), "removed model archive"),
        Err(e) => tracing::warn!(
            path = %archive_path.display(),
            error = %e,
            "failed to remove model archive"
        ),
    }
}
