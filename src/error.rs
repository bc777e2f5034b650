// colablint - Errors
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Notebook resolution failures. Fatal to the whole-notebook check only;
// per-cell operations report tool failures through CommandOutcome instead.

use std::path::PathBuf;
use thiserror::Error;

/// Why the current notebook could not be located.
/// Clone so a locator can cache the failure for its lifetime.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotebookError {
    #[error("Not a Colab environment. Switch to a Colab runtime to check the whole notebook.")]
    NotColab,

    #[error("Drive not mounted at {0:?}. Mount Google Drive first (drive.mount('/content/drive')).")]
    DriveNotMounted(PathBuf),

    #[error("Could not determine host address: {0}")]
    HostAddress(String),

    #[error("Session API request failed: {0}")]
    SessionApi(String),

    #[error("Session API returned no sessions. Check if the notebook is saved.")]
    NoSessions,

    #[error("File {filename:?} not found under {root:?}. Ensure the notebook is in 'My Drive'.")]
    NotFound { filename: String, root: PathBuf },

    #[error("Failed to walk {0}")]
    Walk(String),
}
