// colablint - Interactive Command Shell
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Named interactive commands (`cl check`, `cl format`, `cl sql <var>`,
// `cl fullcheck`, `cl auto ...`) wired to the cell library and the
// notebook locator. A host feeds it a command line plus the cell body and
// gets back text to print and, optionally, a replacement for the cell.

use crate::cell::{self, FormatResult, Report, SqlOutcome};
use crate::context::LinterContext;
use crate::hooks::{HookRegistry, PendingCell, PRE_RUN_CELL};
use crate::runner::CommandOutcome;

const AUTO_FIX_HOOK: &str = "colablint.autofix";
const AUTO_FORMAT_HOOK: &str = "colablint.autoformat";

const CELL_REPORT_HEADER: &str = "--- Code Quality & Style Check Report ---";
const CELL_REPORT_FOOTER: &str = "-------------------------------------------";
const NOTEBOOK_REPORT_HEADER: &str = "---- Notebook Quality & Style Check Report ----";
const NOTEBOOK_REPORT_FOOTER: &str = "-------------------------------------------------------------";

const USAGE: &str = "\
Usage: cl <command>
  report          lint the cell, print diagnostics
  check           lint the cell, print diagnostics, apply auto-fixes
  format          format the cell and sort imports
  sql <var>       reformat the SQL string assigned to <var>
  fullcheck       lint the whole notebook on the mounted drive
  auto fix|format|off|status
                  rewrite every cell before it runs
  help            show this message";

/// What a command wants the host to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReply {
    /// Lines to show the user
    pub printed: Vec<String>,
    /// New source for the pending cell
    pub replacement: Option<String>,
}

impl CommandReply {
    fn say(&mut self, line: impl Into<String>) {
        self.printed.push(line.into());
    }
}

/// True for commands whose effect lives in the Shell's hook registry and
/// is lost when a one-shot process exits.
pub fn needs_live_shell(line: &str) -> bool {
    line.split_whitespace().next() == Some("auto")
}

/// Command dispatcher plus the host's pre-run hooks
pub struct Shell {
    context: LinterContext,
    hooks: HookRegistry,
}

impl Shell {
    pub fn new(context: LinterContext) -> Self {
        Self {
            context,
            hooks: HookRegistry::new(),
        }
    }

    pub fn context_mut(&mut self) -> &mut LinterContext {
        &mut self.context
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Run one command line against `cell`. Never fails: problems become
    /// printed lines.
    pub fn run_command(&mut self, line: &str, cell: Option<&str>) -> CommandReply {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("help");
        let rest: Vec<&str> = words.collect();
        let cell = cell.filter(|c| !c.trim().is_empty());

        let mut reply = CommandReply::default();
        match (command, cell) {
            ("help", _) => reply.say(USAGE),
            ("fullcheck", _) => self.full_check(&mut reply),
            ("auto", _) => self.auto(rest.first().copied().unwrap_or("status"), &mut reply),
            ("report" | "check" | "format" | "sql", None) => {
                log::debug!("{}: empty cell, nothing to do", command);
            }
            ("report", Some(cell)) => self.report(cell, &mut reply),
            ("check", Some(cell)) => {
                self.report(cell, &mut reply);
                self.fix(cell, &mut reply);
            }
            ("format", Some(cell)) => self.format(cell, &mut reply),
            ("sql", Some(cell)) => match rest.first() {
                Some(var) => self.sql(cell, var, &mut reply),
                None => reply.say("Usage: cl sql <variable_name>"),
            },
            (other, _) => {
                reply.say(format!("Unknown command: {}", other));
                reply.say(USAGE);
            }
        }
        reply
    }

    /// Fire pre-run hooks on a pending cell and return the source to execute
    pub fn pre_run_cell(&mut self, source: &str) -> PendingCell {
        let mut pending = PendingCell::new(source);
        self.hooks.fire(PRE_RUN_CELL, &mut pending);
        pending
    }

    fn report(&self, cell: &str, reply: &mut CommandReply) {
        reply.say(CELL_REPORT_HEADER);
        match cell::report(cell, &self.context.config.tools) {
            Report::Issues(text) => reply.say(text),
            Report::Clean => reply.say("No issues found. Code is clean."),
            Report::Failed(reason) => reply.say(format!("Lint failed: {}", reason)),
        }
        reply.say(CELL_REPORT_FOOTER);
    }

    fn fix(&self, cell: &str, reply: &mut CommandReply) {
        match cell::check_fix(cell, &self.context.config.tools) {
            CommandOutcome::Success(fixed) if fixed.trim() != cell.trim() => {
                reply.say("Auto-fixes applied.");
                reply.replacement = Some(fixed);
            }
            CommandOutcome::Failed(reason) => reply.say(format!("Auto-fix failed: {}", reason)),
            _ => {}
        }
    }

    fn format(&self, cell: &str, reply: &mut CommandReply) {
        match cell::format(cell, &self.context.config.tools) {
            FormatResult::Changed(code) => {
                reply.say("Code formatted.");
                reply.replacement = Some(code);
            }
            FormatResult::Unchanged => reply.say("Code already formatted. No changes needed."),
            FormatResult::Failed(reason) => reply.say(format!("Formatting failed: {}", reason)),
        }
    }

    fn sql(&self, cell: &str, var: &str, reply: &mut CommandReply) {
        match cell::reformat_sql(cell, var, &self.context.config.tools) {
            SqlOutcome::Reformatted(code) => {
                reply.say(format!("SQL in '{}' reformatted.", var));
                reply.replacement = Some(code);
            }
            SqlOutcome::NoMatch => {
                reply.say(format!("No string assignment to '{}' found in this cell.", var))
            }
            SqlOutcome::Failed(reason) => reply.say(format!("SQL formatting failed: {}", reason)),
        }
    }

    fn full_check(&mut self, reply: &mut CommandReply) {
        match self.context.check_notebook() {
            Ok((path, report)) => {
                reply.say(format!("File path found: {}", path.display()));
                reply.say(NOTEBOOK_REPORT_HEADER);
                match report {
                    Report::Issues(text) => reply.say(text),
                    Report::Clean => reply.say("No issues found in the entire notebook. Code is clean."),
                    Report::Failed(reason) => reply.say(format!("Check full failed: {}", reason)),
                }
                reply.say(NOTEBOOK_REPORT_FOOTER);
            }
            Err(e) => reply.say(e.to_string()),
        }
    }

    fn auto(&mut self, mode: &str, reply: &mut CommandReply) {
        match mode {
            "fix" | "on" => {
                let tools = self.context.config.tools.clone();
                self.hooks.register(
                    PRE_RUN_CELL,
                    AUTO_FIX_HOOK,
                    Box::new(move |pending: &mut PendingCell| {
                        if let CommandOutcome::Success(fixed) = cell::check_fix(&pending.source, &tools) {
                            pending.replace(AUTO_FIX_HOOK, fixed);
                        }
                    }),
                );
                reply.say("Auto-fix enabled for every cell.");
            }
            "format" => {
                let tools = self.context.config.tools.clone();
                self.hooks.register(
                    PRE_RUN_CELL,
                    AUTO_FORMAT_HOOK,
                    Box::new(move |pending: &mut PendingCell| {
                        if let FormatResult::Changed(code) = cell::format(&pending.source, &tools) {
                            pending.replace(AUTO_FORMAT_HOOK, code);
                        }
                    }),
                );
                reply.say("Auto-format enabled for every cell.");
            }
            "off" => {
                let fix = self.hooks.unregister(PRE_RUN_CELL, AUTO_FIX_HOOK);
                let format = self.hooks.unregister(PRE_RUN_CELL, AUTO_FORMAT_HOOK);
                if fix || format {
                    reply.say("Auto mode disabled.");
                } else {
                    reply.say("Auto mode was not enabled.");
                }
            }
            "status" => {
                let active = self.hooks.registered(PRE_RUN_CELL);
                if active.is_empty() {
                    reply.say("Auto mode: off");
                } else {
                    reply.say(format!("Auto mode: {}", active.join(", ")));
                }
            }
            other => reply.say(format!("Unknown auto mode: {} (expected fix, format, off, status)", other)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinterConfig, LocatorConfig, ToolCommand};
    use crate::error::NotebookError;
    use crate::host::HostRuntime;
    use crate::notebook::NotebookLocator;
    use crate::session::{SessionRecord, SessionSource};

    struct NoHost;

    impl HostRuntime for NoHost {
        fn in_colab(&self) -> bool {
            false
        }
        fn kernel_id(&self) -> Option<String> {
            None
        }
    }

    struct NoSessions;

    impl SessionSource for NoSessions {
        fn list_sessions(&self) -> Result<Vec<SessionRecord>, NotebookError> {
            Ok(Vec::new())
        }
    }

    /// "Linter" that prints a diagnostic for lines containing `bad`,
    /// "fixer" that rewrites `bad` to `good`.
    fn shell() -> Shell {
        let mut config = LinterConfig::default();
        config.tools.lint = ToolCommand::new(
            "sh",
            &[
                "-c",
                "input=$(cat); case \"$*\" in *--fix*) printf '%s' \"$input\" | sed s/bad/good/ ;; *) printf '%s' \"$input\" | grep bad | sed 's/^/E000 /' ;; esac",
                "--",
            ],
        );
        config.tools.format = ToolCommand::new("sh", &["-c", "cat", "--"]);
        config.tools.import_sort = ToolCommand::new("cat", &[]);
        config.tools.sql = ToolCommand::new("tr", &["a-z", "A-Z"]);

        let locator = NotebookLocator::new(&LocatorConfig::default(), Box::new(NoHost), Box::new(NoSessions));
        Shell::new(LinterContext::with_locator(config, locator))
    }

    #[test]
    fn check_reports_and_replaces() {
        let mut shell = shell();
        let reply = shell.run_command("check", Some("x = bad\n"));
        assert!(reply.printed.iter().any(|l| l == "E000 x = bad"));
        assert_eq!(reply.replacement.as_deref(), Some("x = good"));
    }

    #[test]
    fn clean_cell_reports_clean_without_replacement() {
        let mut shell = shell();
        let reply = shell.run_command("check", Some("x = 1\n"));
        assert!(reply.printed.iter().any(|l| l.contains("Code is clean")));
        assert_eq!(reply.replacement, None);
    }

    #[test]
    fn empty_cell_is_a_no_op() {
        let mut shell = shell();
        assert_eq!(shell.run_command("check", Some("  \n")), CommandReply::default());
        assert_eq!(shell.run_command("format", None), CommandReply::default());
    }

    #[test]
    fn sql_command_needs_variable_name() {
        let mut shell = shell();
        let reply = shell.run_command("sql", Some("q = 'select 1'"));
        assert!(reply.printed[0].starts_with("Usage"));

        let reply = shell.run_command("sql q", Some("q = 'select 1'"));
        assert_eq!(reply.replacement.as_deref(), Some("q = '''\nSELECT 1\n'''"));
    }

    #[test]
    fn unknown_command_prints_usage() {
        let mut shell = shell();
        let reply = shell.run_command("explode", Some("x"));
        assert!(reply.printed[0].contains("Unknown command"));
        assert_eq!(reply.replacement, None);
    }

    #[test]
    fn fullcheck_outside_colab_explains_itself() {
        let mut shell = shell();
        let reply = shell.run_command("fullcheck", None);
        assert!(reply.printed[0].contains("Not a Colab environment"));
    }

    #[test]
    fn auto_fix_rewrites_pending_cells_until_disabled() {
        let mut shell = shell();
        shell.run_command("auto fix", None);
        let pending = shell.pre_run_cell("y = bad");
        assert_eq!(pending.source, "y = good");
        assert!(pending.was_rewritten());

        let reply = shell.run_command("auto off", None);
        assert_eq!(reply.printed, vec!["Auto mode disabled."]);
        let pending = shell.pre_run_cell("y = bad");
        assert_eq!(pending.source, "y = bad");
    }

    #[test]
    fn only_auto_needs_a_live_shell() {
        assert!(needs_live_shell("auto fix"));
        assert!(needs_live_shell("  auto"));
        assert!(!needs_live_shell("check"));
        assert!(!needs_live_shell("sql auto"));
        assert!(!needs_live_shell(""));
    }

    #[test]
    fn auto_status_lists_active_hooks() {
        let mut shell = shell();
        assert_eq!(shell.run_command("auto", None).printed, vec!["Auto mode: off"]);
        shell.run_command("auto format", None);
        assert_eq!(
            shell.run_command("auto status", None).printed,
            vec!["Auto mode: colablint.autoformat"]
        );
    }
}
