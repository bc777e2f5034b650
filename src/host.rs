// colablint - Host Runtime Probing
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// What the notebook host tells us about ourselves: are we in a hosted
// runtime, which kernel launched us, which address serves the session API.

use crate::config::LocatorConfig;
use crate::error::NotebookError;
use crate::runner::{self, CommandOutcome};
use std::path::{Path, PathBuf};

/// Set by the hosted notebook runtime in every kernel and child process
const COLAB_ENV_MARKER: &str = "COLAB_RELEASE_TAG";

/// How far up the process tree to look for the kernel
#[cfg(target_os = "linux")]
const MAX_ANCESTORS: usize = 8;

/// Facts about the host runtime the Notebook Locator depends on
pub trait HostRuntime {
    /// True inside the hosted notebook runtime
    fn in_colab(&self) -> bool;
    /// Identifier of the kernel executing the current cell, if discoverable
    fn kernel_id(&self) -> Option<String>;
}

/// The real host: environment variables and the process tree
#[derive(Debug, Clone, Default)]
pub struct ProcessHost {
    /// Explicit kernel connection file, skips process-tree discovery
    pub connection_file: Option<PathBuf>,
}

impl HostRuntime for ProcessHost {
    fn in_colab(&self) -> bool {
        std::env::var_os(COLAB_ENV_MARKER).is_some()
    }

    fn kernel_id(&self) -> Option<String> {
        let file = match &self.connection_file {
            Some(path) => path.clone(),
            None => find_connection_file()?,
        };
        let id = kernel_id_from_connection_file(&file);
        if id.is_none() {
            log::debug!("Connection file {:?} does not name a kernel", file);
        }
        id
    }
}

/// `/root/.local/share/jupyter/runtime/kernel-<id>.json` → `<id>`
pub fn kernel_id_from_connection_file(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_prefix("kernel-").unwrap_or(name);
    let id = id.strip_suffix(".json").unwrap_or(id);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Pull the connection file out of a kernel command line
/// (`-f <file>`, `-f=<file>` or `--f=<file>`).
pub fn connection_file_from_args(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-f" || arg == "--f" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(value) = arg.strip_prefix("--f=").or_else(|| arg.strip_prefix("-f=")) {
            return Some(PathBuf::from(value));
        }
    }
    None
}

/// Walk ancestor processes looking for the kernel's command line.
/// Cells run shell commands through `sh -c`, so the kernel is usually
/// the grandparent.
#[cfg(target_os = "linux")]
pub fn find_connection_file() -> Option<PathBuf> {
    let mut pid = std::os::unix::process::parent_id();
    for _ in 0..MAX_ANCESTORS {
        if pid <= 1 {
            break;
        }
        if let Some(args) = read_cmdline(pid) {
            if let Some(file) = connection_file_from_args(&args) {
                log::debug!("Kernel connection file found in pid {}: {:?}", pid, file);
                return Some(file);
            }
        }
        pid = parent_pid(pid)?;
    }
    None
}

#[cfg(not(target_os = "linux"))]
pub fn find_connection_file() -> Option<PathBuf> {
    None
}

#[cfg(target_os = "linux")]
fn read_cmdline(pid: u32) -> Option<Vec<String>> {
    let raw = std::fs::read(format!("/proc/{}/cmdline", pid)).ok()?;
    Some(
        raw.split(|b| *b == 0)
            .filter(|part| !part.is_empty())
            .map(|part| String::from_utf8_lossy(part).to_string())
            .collect(),
    )
}

/// Parent pid from `/proc/<pid>/stat`. The command name may contain
/// spaces and parentheses, so fields are counted after the last ')'.
#[cfg(target_os = "linux")]
fn parent_pid(pid: u32) -> Option<u32> {
    let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
    parse_ppid(&stat)
}

#[cfg(target_os = "linux")]
fn parse_ppid(stat: &str) -> Option<u32> {
    let after_comm = &stat[stat.rfind(')')? + 1..];
    // state, ppid
    after_comm.split_whitespace().nth(1)?.parse().ok()
}

/// Address of this machine as seen by the session API.
/// Config override first, otherwise the first token of `hostname -I`.
pub fn host_address(config: &LocatorConfig) -> Result<String, NotebookError> {
    if let Some(host) = config.api_host.as_deref() {
        if !host.trim().is_empty() {
            return Ok(host.trim().to_string());
        }
    }

    match runner::run(&config.host_address, "") {
        CommandOutcome::Success(out) => out
            .split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| NotebookError::HostAddress("empty output".to_string())),
        CommandOutcome::Empty => Err(NotebookError::HostAddress(format!(
            "{} printed nothing",
            config.host_address.display()
        ))),
        CommandOutcome::Failed(reason) => Err(NotebookError::HostAddress(reason)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
