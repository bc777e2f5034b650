// colablint - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Tool invocations, rule selection, drive root and session API settings.
// Loaded from config.json, falling back to compiled defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Synthetic filename handed to tools reading from stdin, so diagnostics
/// carry a plausible file/line context.
pub const CELL_FILE_NAME: &str = "notebook_cell.py";

/// Default sqlfluff config written by `colablint init-config`
pub const DEFAULT_SQLFLUFF_CONFIG: &str = "\
[sqlfluff]
dialect = postgres

[sqlfluff:indentation]
indent_unit = space
tab_space_size = 4
indented_joins = True

[sqlfluff:rules:capitalisation.keywords]
capitalisation_policy = upper

[sqlfluff:rules:capitalisation.types]
extended_capitalisation_policy = upper

[sqlfluff:rules:capitalisation.literals]
capitalisation_policy = upper

[sqlfluff:rules:aliasing.column]
aliasing = explicit

[sqlfluff:rules:aliasing.table]
aliasing = explicit
";

/// An external program plus its fixed leading arguments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Copy of this command with extra arguments appended
    pub fn with_args<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cmd = self.clone();
        cmd.args.extend(extra.into_iter().map(Into::into));
        cmd
    }

    /// Human-readable command line for logs
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Everything the Cell Command Library needs to build its invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// `ruff check` (without rule flags)
    pub lint: ToolCommand,
    /// `ruff format` (without the stdin filename)
    pub format: ToolCommand,
    /// `isort --profile=black -`
    pub import_sort: ToolCommand,
    /// `sqlfluff fix --dialect postgres -`
    pub sql: ToolCommand,
    pub ruleset: Vec<String>,
    /// Rules ignored for single cells (unused imports are normal there)
    pub cell_ignore: Vec<String>,
    pub line_length: u32,
    /// Pipe formatter output through the import sorter
    pub sort_imports: bool,
    /// Passed to sqlfluff as `--config` when set
    #[serde(default)]
    pub sqlfluff_config: Option<PathBuf>,
}

/// Notebook Locator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    pub drive_root: PathBuf,
    pub api_port: u16,
    pub api_timeout_secs: u64,
    /// Skip `hostname -I` and use this address for the session API
    #[serde(default)]
    pub api_host: Option<String>,
    /// `hostname -I`
    pub host_address: ToolCommand,
    /// Refuse to run outside the hosted notebook runtime
    pub require_colab: bool,
}

/// Master colablint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinterConfig {
    pub version: String,
    pub tools: ToolsConfig,
    pub locator: LocatorConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            lint: ToolCommand::new("ruff", &["check"]),
            format: ToolCommand::new("ruff", &["format"]),
            import_sort: ToolCommand::new("isort", &["--profile=black", "-"]),
            sql: ToolCommand::new("sqlfluff", &["fix", "--dialect", "postgres", "-"]),
            ruleset: vec!["F".into(), "E".into(), "I".into(), "B".into()],
            cell_ignore: vec!["F401".into()],
            line_length: 100,
            sort_imports: true,
            sqlfluff_config: None,
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            drive_root: PathBuf::from(crate::paths::DEFAULT_DRIVE_ROOT),
            api_port: 9000,
            api_timeout_secs: 5,
            api_host: None,
            host_address: ToolCommand::new("hostname", &["-I"]),
            require_colab: true,
        }
    }
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            tools: ToolsConfig::default(),
            locator: LocatorConfig::default(),
        }
    }
}

impl LinterConfig {
    /// Load config from JSON file, falling back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            log::warn!("Config not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save config to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write default config.json and .sqlfluff without reading what is
    /// already there, so a broken config can always be replaced.
    /// Returns each path with whether it was written.
    pub fn init_files(
        config_path: &Path,
        sqlfluff_path: &Path,
        force: bool,
    ) -> anyhow::Result<Vec<(PathBuf, bool)>> {
        let mut defaults = Self::default();
        defaults.tools.sqlfluff_config = Some(sqlfluff_path.to_path_buf());
        let json = serde_json::to_string_pretty(&defaults)?;

        let mut written = Vec::new();
        for (path, contents) in [(config_path, json.as_str()), (sqlfluff_path, DEFAULT_SQLFLUFF_CONFIG)] {
            written.push((path.to_path_buf(), write_file(path, contents, force)?));
        }
        Ok(written)
    }

    /// Point sqlfluff at `default_path`, creating it with the default
    /// style on first use. An explicit `sqlfluff_config` is left alone.
    pub fn ensure_sqlfluff_config(&mut self, default_path: &Path) {
        if self.tools.sqlfluff_config.is_some() {
            return;
        }
        match write_file(default_path, DEFAULT_SQLFLUFF_CONFIG, false) {
            Ok(created) => {
                if created {
                    log::info!("Wrote default sqlfluff config to {:?}", default_path);
                }
                self.tools.sqlfluff_config = Some(default_path.to_path_buf());
            }
            Err(e) => log::warn!("Could not write sqlfluff config {:?}: {}", default_path, e),
        }
    }
}

fn write_file(path: &Path, contents: &str, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(true)
}

impl ToolsConfig {
    fn rule_args(&self) -> Vec<String> {
        vec![
            "--select".to_string(),
            self.ruleset.join(","),
        ]
    }

    /// `ruff check --select F,E,I,B --ignore F401 --line-length 100 --stdin-filename=notebook_cell.py`
    pub fn cell_report_command(&self) -> ToolCommand {
        let mut args = self.rule_args();
        if !self.cell_ignore.is_empty() {
            args.push("--ignore".to_string());
            args.push(self.cell_ignore.join(","));
        }
        args.push("--line-length".to_string());
        args.push(self.line_length.to_string());
        args.push(format!("--stdin-filename={}", CELL_FILE_NAME));
        self.lint.with_args(args)
    }

    /// Report command plus `--fix`
    pub fn cell_fix_command(&self) -> ToolCommand {
        self.cell_report_command().with_args(["--fix"])
    }

    pub fn cell_format_command(&self) -> ToolCommand {
        self.format.with_args([format!("--stdin-filename={}", CELL_FILE_NAME)])
    }

    /// Whole-file check: no ignore list, the path replaces stdin
    pub fn notebook_report_command(&self, notebook_path: &Path) -> ToolCommand {
        let mut args = self.rule_args();
        args.push("--line-length".to_string());
        args.push(self.line_length.to_string());
        args.push(notebook_path.to_string_lossy().to_string());
        self.lint.with_args(args)
    }

    pub fn sql_command(&self) -> ToolCommand {
        match &self.sqlfluff_config {
            Some(path) => self
                .sql
                .with_args(["--config".to_string(), path.to_string_lossy().to_string()]),
            None => self.sql.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_report_command_matches_ruff_invocation() {
        let tools = ToolsConfig::default();
        assert_eq!(
            tools.cell_report_command().display(),
            "ruff check --select F,E,I,B --ignore F401 --line-length 100 --stdin-filename=notebook_cell.py"
        );
    }

    #[test]
    fn fix_command_appends_fix_flag() {
        let tools = ToolsConfig::default();
        let cmd = tools.cell_fix_command();
        assert_eq!(cmd.args.last().map(String::as_str), Some("--fix"));
    }

    #[test]
    fn notebook_report_keeps_unused_import_rule() {
        let tools = ToolsConfig::default();
        let cmd = tools.notebook_report_command(Path::new("/content/drive/MyDrive/a b.ipynb"));
        assert!(!cmd.args.iter().any(|a| a == "--ignore"));
        assert_eq!(cmd.args.last().map(String::as_str), Some("/content/drive/MyDrive/a b.ipynb"));
    }

    #[test]
    fn sql_command_passes_config_when_set() {
        let mut tools = ToolsConfig::default();
        assert!(!tools.sql_command().args.iter().any(|a| a == "--config"));
        tools.sqlfluff_config = Some(PathBuf::from("/tmp/.sqlfluff"));
        let cmd = tools.sql_command();
        assert!(cmd.args.windows(2).any(|w| w[0] == "--config" && w[1] == "/tmp/.sqlfluff"));
    }

    #[test]
    fn default_locator_targets_port_9000_with_5s_timeout() {
        let config = LinterConfig::default();
        assert_eq!(config.locator.api_port, 9000);
        assert_eq!(config.locator.api_timeout_secs, 5);
        assert_eq!(config.locator.drive_root, PathBuf::from("/content/drive"));
    }

    #[test]
    fn save_then_load_preserves_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let mut config = LinterConfig::default();
        config.tools.line_length = 88;
        config.locator.api_host = Some("10.0.0.2".to_string());
        config.save(&path).unwrap();

        let loaded = LinterConfig::load(&path).unwrap();
        assert_eq!(loaded.tools.line_length, 88);
        assert_eq!(loaded.locator.api_host.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn init_files_replaces_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let sqlfluff_path = dir.path().join(".sqlfluff");
        std::fs::write(&config_path, "{bad").unwrap();
        assert!(LinterConfig::load(&config_path).is_err());

        let written = LinterConfig::init_files(&config_path, &sqlfluff_path, true).unwrap();
        assert!(written.iter().all(|(_, wrote)| *wrote));

        let loaded = LinterConfig::load(&config_path).unwrap();
        assert_eq!(loaded.tools.sqlfluff_config, Some(sqlfluff_path.clone()));
        assert_eq!(std::fs::read_to_string(&sqlfluff_path).unwrap(), DEFAULT_SQLFLUFF_CONFIG);
    }

    #[test]
    fn init_files_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "{bad").unwrap();

        let written = LinterConfig::init_files(&config_path, &dir.path().join(".sqlfluff"), false).unwrap();
        assert_eq!(written[0], (config_path.clone(), false));
        assert!(written[1].1);
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "{bad");
    }

    #[test]
    fn sqlfluff_style_written_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg/.sqlfluff");

        let mut config = LinterConfig::default();
        config.ensure_sqlfluff_config(&path);
        assert_eq!(config.tools.sqlfluff_config, Some(path.clone()));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("capitalisation_policy = upper"));
        assert!(written.contains("aliasing = explicit"));
        assert!(config.tools.sql_command().args.iter().any(|a| a == "--config"));
    }

    #[test]
    fn explicit_sqlfluff_config_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join(".sqlfluff");

        let mut config = LinterConfig::default();
        config.tools.sqlfluff_config = Some(PathBuf::from("/etc/team.sqlfluff"));
        config.ensure_sqlfluff_config(&default);
        assert_eq!(config.tools.sqlfluff_config, Some(PathBuf::from("/etc/team.sqlfluff")));
        assert!(!default.exists());
    }

    #[test]
    fn existing_sqlfluff_config_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".sqlfluff");
        std::fs::write(&path, "[sqlfluff]\ndialect = bigquery\n").unwrap();

        let mut config = LinterConfig::default();
        config.ensure_sqlfluff_config(&path);
        assert_eq!(config.tools.sqlfluff_config, Some(path.clone()));
        assert!(std::fs::read_to_string(&path).unwrap().contains("bigquery"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LinterConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.tools.ruleset, vec!["F", "E", "I", "B"]);
    }
}
