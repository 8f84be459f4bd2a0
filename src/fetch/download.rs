use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::ArchiveSource;

/// Fetches archives over plain HTTP(S) GET
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpArchiveSource;

impl ArchiveSource for HttpArchiveSource {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        download_archive(url, dest).map(|_| ())
    }
}

/// Downloads `url` to `dest`, returning the number of bytes written
///
/// The body is streamed into `<dest>.part` and renamed into place once complete.
///
/// # Errors
/// Returns error on network failure, non-success status, or filesystem failure
pub fn download_archive(url: &str, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).context("failed to create archive directory")?;
    }

    tracing::info!(url = %url, "downloading model archive");

    let temp_path = dest.with_extension("part");

    let mut response = reqwest::blocking::get(url)
        .with_context(|| format!("failed to download archive from {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("download failed with status {}: {}", response.status(), url);
    }

    let mut file = fs::File::create(&temp_path)
        .with_context(|| format!("failed to create temp file at {}", temp_path.display()))?;

    let written = match response.copy_to(&mut file) {
        Ok(written) => written,
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(&temp_path);
            return Err(e).context("failed to write archive to temp file");
        }
    };

    // Drop file handle before rename
    drop(file);

    persist(&temp_path, dest)?;

    tracing::info!(
        path = %dest.display(),
        size = written,
        "model archive downloaded"
    );

    Ok(written)
}

/// Moves a completed download into place, removing it if the move fails
fn persist(temp_path: &Path, dest: &Path) -> Result<()> {
    if let Err(e) = fs::rename(temp_path, dest) {
        let _ = fs::remove_file(temp_path);
        return Err(e).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                dest.display()
            )
        });
    }
    Ok(())
}
