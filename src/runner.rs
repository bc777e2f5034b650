// colablint - Command Runner
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Runs one external tool with cell text on stdin and classifies the result.
// Never panics, never returns Err: every failure becomes Failed(reason).

use crate::config::ToolCommand;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};

/// Result of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum CommandOutcome {
    /// Tool printed something on stdout (already trimmed)
    Success(String),
    /// Tool exited cleanly with nothing on stdout
    Empty,
    /// Spawn error, I/O error, or non-zero exit with nothing on stdout
    Failed(String),
}

impl CommandOutcome {
    /// Optional-text view: Some only when the tool produced output
    pub fn into_text(self) -> Option<String> {
        match self {
            CommandOutcome::Success(text) => Some(text),
            CommandOutcome::Empty | CommandOutcome::Failed(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            CommandOutcome::Success(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CommandOutcome::Failed(_))
    }
}

/// Route tool stderr to the logger.
/// "Found N errors" is a lint summary, "All checks passed!" is noise,
/// anything else is a real subprocess complaint.
fn log_stderr(stderr: &str) {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return;
    }
    if stderr.contains("Found") {
        log::warn!("Linter: {}", stderr);
    } else if stderr.contains("All checks passed") {
        // nothing to say
    } else {
        log::error!("Subprocess: {}", stderr);
    }
}

/// Run `command` with `input` on stdin.
///
/// Linters exit non-zero when they find something, so non-empty stdout is
/// Success regardless of exit status. Empty stdout is Empty on a clean exit
/// and Failed otherwise.
pub fn run(command: &ToolCommand, input: &str) -> CommandOutcome {
    log::debug!("exec: {}", command.display());

    let mut child = match Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            let reason = format!("Failed to run {}: {}", command.program, e);
            log::error!("Error running command: {}", reason);
            return CommandOutcome::Failed(reason);
        }
    };

    // Feed stdin from its own thread so a chatty tool cannot fill the
    // stdout pipe while we are still writing.
    let writer = child.stdin.take().map(|mut stdin| {
        let payload = input.to_string();
        std::thread::spawn(move || -> std::io::Result<()> {
            stdin.write_all(payload.as_bytes())?;
            stdin.flush()
        })
    });

    let output = match child.wait_with_output() {
        Ok(output) => output,
        Err(e) => {
            let reason = format!("Failed to collect output of {}: {}", command.program, e);
            log::error!("Error running command: {}", reason);
            return CommandOutcome::Failed(reason);
        }
    };

    if let Some(handle) = writer {
        match handle.join() {
            Ok(Ok(())) => {}
            // Tools that ignore stdin close the pipe early; not fatal.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => log::warn!("stdin write to {} failed: {}", command.program, e),
            Err(_) => log::warn!("stdin writer for {} panicked", command.program),
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    log_stderr(&stderr);

    if !stdout.is_empty() {
        CommandOutcome::Success(stdout)
    } else if output.status.success() {
        CommandOutcome::Empty
    } else {
        let stderr = stderr.trim();
        let reason = if stderr.is_empty() {
            format!("{} exited with {}", command.program, output.status)
        } else {
            stderr.to_string()
        };
        CommandOutcome::Failed(reason)
    }
}

// ============================================================================
// TESTS
// ============================================================================
