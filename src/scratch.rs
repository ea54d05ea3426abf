//! Scratch space for staged uploads and rendered pages
//!
//! Every file handed out here is owned by a [`StagedFile`] guard. The guard
//! removes the file on [`StagedFile::cleanup`] or, failing that, on drop, so
//! a request that bails out early still leaves nothing behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempPath;

const FILE_PREFIX: &str = "ocr-";

/// Directory where temporary files are created
#[derive(Clone, Debug)]
pub struct ScratchSpace {
    dir: PathBuf,
    live: Arc<AtomicUsize>,
}

impl ScratchSpace {
    /// Bind to `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of staged files not yet cleaned up
    pub fn live_files(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Write `data` to a fresh, randomly named file ending in `suffix`.
    pub fn stage(&self, data: &[u8], suffix: &str) -> io::Result<StagedFile> {
        let mut file = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .suffix(suffix)
            .tempfile_in(&self.dir)?;

        file.write_all(data)?;
        file.flush()?;
        let temp = file.into_temp_path();

        self.live.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %temp.display(), bytes = data.len(), "Staged scratch file");

        Ok(StagedFile {
            path: temp.to_path_buf(),
            temp: Some(temp),
            live: Arc::clone(&self.live),
        })
    }
}

/// A file on scratch storage, removed when the guard is cleaned up or dropped
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    temp: Option<TempPath>,
    live: Arc<AtomicUsize>,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now. A file that is already gone is not an error.
    pub fn cleanup(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };
        self.live.fetch_sub(1, Ordering::Relaxed);

        match temp.close() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Scratch file already gone");
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to remove scratch file: {}", e);
            }
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Pick the suffix for a staged upload.
///
/// Uses the extension of the client's filename when there is one, otherwise
/// `.pdf` for PDFs and `.jpg` for everything else.
pub fn suffix_for(filename: Option<&str>, content_type: &str) -> String {
    let extension = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!(".{}", ext),
        None if content_type == crate::ocr::PDF_CONTENT_TYPE => ".pdf".to_string(),
        None => ".jpg".to_string(),
    }
}
