// colablint - Linter Context
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Owns the config and the notebook locator for one host session.
// Constructed explicitly and passed around; there is no global instance.

use crate::cell::Report;
use crate::config::LinterConfig;
use crate::error::NotebookError;
use crate::host::ProcessHost;
use crate::notebook::{self, NotebookIdentity, NotebookLocator};
use crate::session::HttpSessionSource;
use std::path::PathBuf;

pub struct LinterContext {
    pub config: LinterConfig,
    locator: NotebookLocator,
}

impl LinterContext {
    /// Context wired to the real host: process tree + local session API
    pub fn new(config: LinterConfig, connection_file: Option<PathBuf>) -> Result<Self, NotebookError> {
        let sessions = HttpSessionSource::new(&config.locator)?;
        let host = ProcessHost { connection_file };
        let locator = NotebookLocator::new(&config.locator, Box::new(host), Box::new(sessions));
        Ok(Self { config, locator })
    }

    pub fn with_locator(config: LinterConfig, locator: NotebookLocator) -> Self {
        Self { config, locator }
    }

    pub fn locate(&mut self) -> Result<&NotebookIdentity, NotebookError> {
        self.locator.resolve()
    }

    pub fn check_notebook(&mut self) -> Result<(PathBuf, Report), NotebookError> {
        notebook::check_notebook(&mut self.locator, &self.config.tools)
    }
}
