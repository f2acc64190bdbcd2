//! Directory walk and fail-fast upload loop.
//!
//! Files under the root are visited depth-first with entries sorted by name, so the order is
//! stable across runs. Each file is uploaded exactly once, one at a time, and the first failure
//! ends the run: later files are never attempted. Each outcome is printed to stdout as a
//! notice line regardless of the tracing filter.

use crate::dataset::{ServerResponse, UploadError, client::base_name};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Single-file upload operation driven by [`run`].
pub trait FileUploader {
    /// Upload the file at `path`, returning the parsed server response.
    fn upload_file(&self, path: &Path) -> Result<ServerResponse, UploadError>;
}

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum RunError {
    /// Root path is missing or is not a directory.
    #[error("Upload root is not a readable directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Traversal settings for a run.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Descend into subdirectories; when `false` only direct children of the root are uploaded.
    pub recursive: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { recursive: true }
    }
}

/// Result of a completed or halted run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every file was uploaded.
    Completed {
        /// Number of files uploaded.
        uploaded: usize,
    },
    /// The run stopped at the first failure.
    Halted {
        /// 1-based position of the failing file in traversal order.
        failed_at: usize,
        /// Path that failed.
        path: PathBuf,
        /// Description of the failure.
        error: String,
        /// Files uploaded before the failure.
        uploaded: usize,
    },
}

impl RunOutcome {
    /// Whether every file succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Number of files uploaded successfully.
    pub fn uploaded(&self) -> usize {
        match self {
            Self::Completed { uploaded } | Self::Halted { uploaded, .. } => *uploaded,
        }
    }
}

/// Upload every file under `root`, stopping at the first failure.
pub fn run<U>(root: &Path, uploader: &U, options: WalkOptions) -> Result<RunOutcome, RunError>
where
    U: FileUploader + ?Sized,
{
    if !root.is_dir() {
        return Err(RunError::NotADirectory(root.to_path_buf()));
    }

    tracing::info!(root = %root.display(), recursive = options.recursive, "Starting upload run");
    let mut uploaded = 0;

    for entry in walk_files(root, options) {
        let failed_at = uploaded + 1;
        let path = match entry {
            Ok(path) => path,
            Err(error) => {
                let path = error
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                tracing::error!(path = %path.display(), error = %error, "Directory walk failed; stopping run");
                println!("Failed to read {}: {error}", path.display());
                return Ok(RunOutcome::Halted {
                    failed_at,
                    path,
                    error: error.to_string(),
                    uploaded,
                });
            }
        };

        let file_name = base_name(&path);
        match uploader.upload_file(&path) {
            Ok(response) => {
                uploaded += 1;
                tracing::info!(file = %file_name, response = %response, "Uploaded file");
                println!("Uploaded {file_name}: {response}");
            }
            Err(error) => {
                tracing::error!(file = %file_name, error = %error, "Upload failed; stopping run");
                println!("Failed to upload {file_name}: {error}");
                return Ok(RunOutcome::Halted {
                    failed_at,
                    path,
                    error: error.to_string(),
                    uploaded,
                });
            }
        }
    }

    tracing::info!(uploaded, "Upload run completed");
    Ok(RunOutcome::Completed { uploaded })
}

/// Non-directory entries under `root` in traversal order.
fn walk_files(
    root: &Path,
    options: WalkOptions,
) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> {
    let max_depth = if options.recursive { usize::MAX } else { 1 };
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if is_directory(&entry) => None,
            Ok(entry) => Some(Ok(entry.into_path())),
            Err(error) => Some(Err(error)),
        })
}

fn is_directory(entry: &DirEntry) -> bool {
    // Symlinked directories are not followed, but they are not files either.
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}
