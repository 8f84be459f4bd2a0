use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Unpacks every entry of the zip archive at `archive` into `into`
///
/// Entries whose paths would land outside `into` are rejected by the zip reader.
/// Returns the number of entries in the archive.
///
/// # Errors
/// Returns error if the archive can't be opened, isn't a valid zip, or an entry
/// fails to extract
pub fn extract_archive(archive: &Path, into: &Path) -> Result<usize> {
    let file = fs::File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;

    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid zip archive", archive.display()))?;
    let entries = zip.len();

    tracing::info!(
        archive = %archive.display(),
        into = %into.display(),
        entries,
        "extracting model archive"
    );

    zip.extract(into)
        .with_context(|| format!("failed to extract into {}", into.display()))?;

    Ok(entries)
}

/// Sorted entry names of `path`, used to diagnose unexpected archive layouts
///
/// # Errors
/// Returns error if the directory can't be read
pub fn list_dir(path: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(path)
        .with_context(|| format!("failed to read directory {}", path.display()))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
