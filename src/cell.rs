// colablint - Cell Command Library
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Report, fix, format and SQL-reformat operations over one cell of text.
// Each is a thin composition over runner::run with a fixed invocation.

use crate::config::ToolsConfig;
use crate::runner::{self, CommandOutcome};
use crate::sql;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Diagnostics for a cell or a whole notebook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Report {
    Issues(String),
    Clean,
    Failed(String),
}

/// Result of the format pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatResult {
    Changed(String),
    Unchanged,
    Failed(String),
}

/// Result of rewriting an embedded SQL literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlOutcome {
    Reformatted(String),
    NoMatch,
    Failed(String),
}

fn report_from(outcome: CommandOutcome) -> Report {
    match outcome {
        CommandOutcome::Success(text) => Report::Issues(text),
        CommandOutcome::Empty => Report::Clean,
        CommandOutcome::Failed(reason) => Report::Failed(reason),
    }
}

/// Run the linter read-only over a cell
pub fn report(cell: &str, tools: &ToolsConfig) -> Report {
    report_from(runner::run(&tools.cell_report_command(), cell))
}

/// Run the linter with auto-fix. Success carries the fixed code;
/// Empty or Failed both mean "leave the cell as it is".
pub fn check_fix(cell: &str, tools: &ToolsConfig) -> CommandOutcome {
    runner::run(&tools.cell_fix_command(), cell)
}

/// Format a cell, then sort its imports.
///
/// A failed import sort falls back to the formatter's own output; a failed
/// or empty formatter run fails the whole pipeline.
pub fn format(cell: &str, tools: &ToolsConfig) -> FormatResult {
    let formatted = match runner::run(&tools.cell_format_command(), cell) {
        CommandOutcome::Success(text) => text,
        CommandOutcome::Empty => {
            return FormatResult::Failed("Formatter produced no output".to_string())
        }
        CommandOutcome::Failed(reason) => return FormatResult::Failed(reason),
    };

    let best = if tools.sort_imports {
        match runner::run(&tools.import_sort, &formatted) {
            CommandOutcome::Success(sorted) => sorted,
            CommandOutcome::Empty | CommandOutcome::Failed(_) => {
                log::warn!("Import sort failed, keeping formatter output");
                formatted
            }
        }
    } else {
        formatted
    };

    if best.trim() == cell.trim() {
        FormatResult::Unchanged
    } else {
        FormatResult::Changed(best)
    }
}

/// Reformat the SQL string literal assigned to `var_name`
pub fn reformat_sql(cell: &str, var_name: &str, tools: &ToolsConfig) -> SqlOutcome {
    let Some(assignment) = sql::find_assignment(cell, var_name) else {
        return SqlOutcome::NoMatch;
    };

    match runner::run(&tools.sql_command(), assignment.body.trim()) {
        CommandOutcome::Success(formatted) => SqlOutcome::Reformatted(assignment.reassemble(&formatted)),
        CommandOutcome::Empty => SqlOutcome::Failed("SQL formatter produced no output".to_string()),
        CommandOutcome::Failed(reason) => SqlOutcome::Failed(reason),
    }
}

/// Lint a whole notebook file in place (nothing on stdin)
pub fn notebook_report(notebook_path: &Path, tools: &ToolsConfig) -> Report {
    report_from(runner::run(&tools.notebook_report_command(notebook_path), ""))
}

// ============================================================================
// TESTS
// ============================================================================
