//! Data directory setup.
//!
//! Before indexing, the data directory is made to hold grid files only:
//!
//! 1. create the directory if needed
//! 2. if it holds no grid files and an archive URL is configured, download
//!    the zip archive and extract its grid entries flat into the directory
//! 3. delete every other regular file
//!
//! The returned paths are sorted by file name. That order is the global
//! record order, so it must not depend on directory enumeration order.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use grid_index::IndexConfig;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Name of the temporary archive while it is downloaded.
const ARCHIVE_FILE: &str = "archive.zip.part";

/// Prepare `dir` and return its grid files in global order.
pub async fn prepare_data_dir(
    dir: &Path,
    archive_url: Option<&str>,
    config: &IndexConfig,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

    if grid_files(dir, config)?.is_empty() {
        match archive_url {
            Some(url) => {
                let archive = dir.join(ARCHIVE_FILE);
                download_archive(url, &archive).await?;

                let dest = dir.to_path_buf();
                let config = config.clone();
                let extracted = tokio::task::spawn_blocking(move || {
                    extract_grid_entries(&archive, &dest, &config)
                })
                .await
                .context("Extraction task failed")??;

                info!(count = extracted, url = %url, "Extracted grid files from archive");
            }
            None => warn!(dir = %dir.display(), "Data directory holds no grid files"),
        }
    }

    remove_non_grid_files(dir, config)?;

    let files = grid_files(dir, config)?;
    info!(dir = %dir.display(), count = files.len(), "Data directory ready");
    Ok(files)
}

/// Grid files directly inside `dir`, sorted by file name.
pub fn grid_files(dir: &Path, config: &IndexConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && config.is_grid_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Delete regular files in `dir` that are not grid files.
pub fn remove_non_grid_files(dir: &Path, config: &IndexConfig) -> Result<usize> {
    let mut removed = 0;
    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && !config.is_grid_file(entry.path()) {
            std::fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
            debug!(path = %entry.path().display(), "Removed non-grid file");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Stream the archive at `url` to `path`.
async fn download_archive(url: &str, path: &Path) -> Result<()> {
    info!(url = %url, "Downloading grid archive");

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;
    if !response.status().is_success() {
        return Err(anyhow!("HTTP error: {}", response.status()));
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .context("Failed to create archive file")?;
    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Error reading response chunk")?;
        file.write_all(&chunk)
            .await
            .context("Error writing to file")?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;
    debug!(bytes = downloaded, "Archive downloaded");
    Ok(())
}

/// Extract the grid entries of a zip archive flat into `dest`, then delete
/// the archive. Directory structure inside the archive is dropped.
pub fn extract_grid_entries(archive: &Path, dest: &Path, config: &IndexConfig) -> Result<usize> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file).context("Invalid ZIP file")?;

    let mut extracted = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).context("Failed to read ZIP entry")?;
        if entry.is_dir() {
            continue;
        }

        // enclosed_name rejects absolute paths and `..` components
        let Some(name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_owned()))
        else {
            warn!(entry = %entry.name(), "Skipping unsafe archive entry");
            continue;
        };

        let target = dest.join(&name);
        if !config.is_grid_file(&target) {
            continue;
        }

        let mut out = File::create(&target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract {}", entry.name()))?;
        debug!(path = %target.display(), "Extracted grid file");
        extracted += 1;
    }

    std::fs::remove_file(archive)
        .with_context(|| format!("Failed to remove archive {}", archive.display()))?;
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_utils::{temp_data_dir, touch_files};

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_prepare_keeps_sorted_grid_files_only() {
        let dir = temp_data_dir();
        touch_files(dir.path(), &["b_2021.nc", "notes.txt", "a_2020.nc", "c.nc.bak"]);
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = prepare_data_dir(dir.path(), None, &IndexConfig::default()).await.unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_2020.nc", "b_2021.nc"]);
        assert!(!dir.path().join("notes.txt").exists());
        assert!(!dir.path().join("c.nc.bak").exists());
        assert!(dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_prepare_creates_missing_directory() {
        let root = temp_data_dir();
        let dir = root.path().join("data");

        let files = prepare_data_dir(&dir, None, &IndexConfig::default()).await.unwrap();
        assert!(files.is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_extract_flattens_and_filters_entries() {
        let dir = temp_data_dir();
        let archive = dir.path().join("grids.zip");
        write_zip(
            &archive,
            &[
                ("V5GL/2019/pm25_2019.nc", b"grid-2019"),
                ("V5GL/README.txt", b"readme"),
                ("pm25_2020.nc", b"grid-2020"),
            ],
        );

        let count = extract_grid_entries(&archive, dir.path(), &IndexConfig::default()).unwrap();
        assert_eq!(count, 2);
        assert!(!archive.exists());
        assert_eq!(
            std::fs::read(dir.path().join("pm25_2019.nc")).unwrap(),
            b"grid-2019"
        );
        assert!(dir.path().join("pm25_2020.nc").exists());
        assert!(!dir.path().join("README.txt").exists());
        assert!(!dir.path().join("V5GL").exists());
    }

    #[test]
    fn test_extract_rejects_invalid_archive() {
        let dir = temp_data_dir();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        assert!(extract_grid_entries(&archive, dir.path(), &IndexConfig::default()).is_err());
    }
}
