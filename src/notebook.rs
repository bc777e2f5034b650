// colablint - Notebook Locator
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Resolves the running notebook to a file on the mounted drive:
// host check -> kernel id -> session name -> drive tree search.
// Resolves at most once per locator; success and failure are both sticky.

use crate::cell::{self, Report};
use crate::config::{LocatorConfig, ToolsConfig};
use crate::error::NotebookError;
use crate::host::HostRuntime;
use crate::session::{self, SessionSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

/// The notebook this process belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookIdentity {
    pub filename: String,
    pub path: PathBuf,
    pub kernel_id: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

/// Resolution progress of a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorState<'a> {
    Unresolved,
    Resolved(&'a NotebookIdentity),
    Failed(&'a NotebookError),
}

/// Finds and caches the current notebook's path
pub struct NotebookLocator {
    drive_root: PathBuf,
    require_colab: bool,
    host: Box<dyn HostRuntime>,
    sessions: Box<dyn SessionSource>,
    outcome: Option<Result<NotebookIdentity, NotebookError>>,
}

impl NotebookLocator {
    pub fn new(
        config: &LocatorConfig,
        host: Box<dyn HostRuntime>,
        sessions: Box<dyn SessionSource>,
    ) -> Self {
        Self {
            drive_root: config.drive_root.clone(),
            require_colab: config.require_colab,
            host,
            sessions,
            outcome: None,
        }
    }

    pub fn state(&self) -> LocatorState<'_> {
        match &self.outcome {
            None => LocatorState::Unresolved,
            Some(Ok(identity)) => LocatorState::Resolved(identity),
            Some(Err(e)) => LocatorState::Failed(e),
        }
    }

    /// Resolve once, then keep answering from the cached state
    pub fn resolve(&mut self) -> Result<&NotebookIdentity, NotebookError> {
        let outcome = match self.outcome.take() {
            Some(cached) => cached,
            None => {
                let fresh = self.resolve_uncached();
                if let Ok(identity) = &fresh {
                    log::info!("File path found: {}", identity.path.display());
                }
                fresh
            }
        };
        self.outcome.insert(outcome).as_ref().map_err(Clone::clone)
    }

    fn resolve_uncached(&self) -> Result<NotebookIdentity, NotebookError> {
        if self.require_colab && !self.host.in_colab() {
            return Err(NotebookError::NotColab);
        }
        if !self.drive_root.is_dir() {
            return Err(NotebookError::DriveNotMounted(self.drive_root.clone()));
        }

        let kernel_id = self.host.kernel_id();
        let sessions = self.sessions.list_sessions()?;
        let filename = session::select_notebook_name(&sessions, kernel_id.as_deref())?;
        log::info!("Notebook filename detected: {}", filename);

        log::info!("Searching file path in {} (this may take time...)", self.drive_root.display());
        let path = find_notebook_path(&self.drive_root, &filename)?.ok_or_else(|| {
            NotebookError::NotFound {
                filename: filename.clone(),
                root: self.drive_root.clone(),
            }
        })?;

        Ok(NotebookIdentity {
            filename,
            path,
            kernel_id,
            resolved_at: Utc::now(),
        })
    }
}

/// Filename equality tolerant of NFC/NFD differences between the
/// session API and the drive mount. Exact bytes first.
pub fn names_match(requested: &str, candidate: &OsStr) -> bool {
    if candidate.as_encoded_bytes() == requested.as_bytes() {
        return true;
    }
    match candidate.to_str() {
        Some(candidate) => requested.nfc().eq(candidate.nfc()),
        None => false,
    }
}

/// First file under `root` named `filename`, depth-first, symlinks not followed
pub fn find_notebook_path(root: &Path, filename: &str) -> Result<Option<PathBuf>, NotebookError> {
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Unreadable subtrees (shared drives, shortcuts) are skipped
                if e.depth() == 0 {
                    return Err(NotebookError::Walk(e.to_string()));
                }
                log::debug!("skipping {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && names_match(filename, entry.file_name()) {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

/// Resolve the notebook (or reuse the cached identity) and lint the whole file
pub fn check_notebook(
    locator: &mut NotebookLocator,
    tools: &ToolsConfig,
) -> Result<(PathBuf, Report), NotebookError> {
    let path = locator.resolve()?.path.clone();
    let report = cell::notebook_report(&path, tools);
    Ok((path, report))
}

// ============================================================================
// TESTS
// ============================================================================
