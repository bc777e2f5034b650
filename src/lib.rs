// colablint - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary, notebook hosts and tests.

pub mod paths;
pub mod config;
pub mod error;
pub mod runner;
pub mod sql;
pub mod cell;

// ============================================================================
// NOTEBOOK LOCATOR - host probe, session API, drive search
// ============================================================================

pub mod host;
pub mod session;
pub mod notebook;

// ============================================================================
// HOST INTEGRATION - context, hooks, interactive commands
// ============================================================================

pub mod context;
pub mod hooks;
pub mod shell;

pub use cell::{check_fix, format, report, FormatResult, Report, SqlOutcome};
pub use context::LinterContext;
pub use error::NotebookError;
pub use runner::CommandOutcome;
