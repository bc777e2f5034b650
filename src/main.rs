// colablint - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI over the cell library. Cell text arrives on stdin; code and reports
// go to stdout, status lines go to stderr through the logger.
// Usage:
//   colablint report < cell.py                    # Lint a cell
//   colablint fix < cell.py                       # Lint with auto-fix, print fixed code
//   colablint format < cell.py                    # ruff format + isort
//   colablint sql --var query < cell.py           # Reformat SQL assigned to `query`
//   colablint pre-run --fix --format < cell.py    # Run pre-execution hooks, print cell
//   colablint cl check < cell.py                  # Interactive command, notebook style
//   colablint check                               # Lint the whole notebook on the drive
//   colablint locate                              # Show the resolved notebook identity
//   colablint init-config                         # Write default config + .sqlfluff
//   colablint show-config                         # Print effective config

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colablint::{
    cell::{self, FormatResult, Report, SqlOutcome},
    config::LinterConfig,
    context::LinterContext,
    paths,
    runner::CommandOutcome,
    shell::{self, Shell},
};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "colablint")]
#[command(version)]
#[command(about = "colablint - lint, fix and format notebook cells with ruff, isort and sqlfluff")]
struct Cli {
    /// Config file (defaults to <config dir>/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint the cell on stdin and print diagnostics
    Report,

    /// Lint with auto-fix; print the fixed cell
    Fix,

    /// Format the cell on stdin and sort its imports
    Format,

    /// Reformat the SQL string literal assigned to a variable
    Sql {
        /// Variable holding the SQL string
        #[arg(long)]
        var: String,
    },

    /// Run pre-execution hooks over the pending cell on stdin
    PreRun {
        /// Apply lint auto-fixes
        #[arg(long)]
        fix: bool,

        /// Apply formatting
        #[arg(long)]
        format: bool,
    },

    /// Run one interactive command (report, check, format, sql <var>, fullcheck, help).
    /// `auto` needs a long-lived host; use `pre-run --fix/--format` instead.
    Cl {
        /// Command line, e.g. `sql query`
        #[arg(required = true)]
        line: Vec<String>,

        /// Kernel connection file (skips process-tree discovery)
        #[arg(long)]
        connection_file: Option<PathBuf>,
    },

    /// Locate the notebook on the mounted drive and lint all of it
    Check {
        /// Kernel connection file (skips process-tree discovery)
        #[arg(long)]
        connection_file: Option<PathBuf>,
    },

    /// Resolve and print the current notebook identity as JSON
    Locate {
        /// Kernel connection file (skips process-tree discovery)
        #[arg(long)]
        connection_file: Option<PathBuf>,
    },

    /// Write default config.json and .sqlfluff
    InitConfig {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Print the effective config as JSON
    ShowConfig,
}

fn init_logging() {
    // Safe if already initialized
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[colablint:{}] {}", record.level(), record.args()))
        .try_init();
}

fn read_cell() -> Result<String> {
    let mut cell = String::new();
    std::io::stdin()
        .read_to_string(&mut cell)
        .context("Failed to read cell from stdin")?;
    Ok(cell)
}

fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf).unwrap_or_else(paths::default_config_path)
}

fn load_config(path: Option<&Path>) -> Result<LinterConfig> {
    let path = config_path(path);
    let mut config = LinterConfig::load(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    config.ensure_sqlfluff_config(&paths::default_sqlfluff_config_path());
    Ok(config)
}

// Never reads the existing config, which may be the broken file being replaced
fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = config_path(path);
    let sqlfluff_path = paths::default_sqlfluff_config_path();
    for (path, wrote) in LinterConfig::init_files(&config_path, &sqlfluff_path, force)? {
        if wrote {
            println!("init-config: wrote {:?}", path);
        } else {
            println!("init-config: {:?} exists (use --force to overwrite)", path);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config_arg = cli.config.as_deref();

    let command = match cli.command {
        Commands::InitConfig { force } => return init_config(config_arg, force),
        command => command,
    };
    let config = load_config(config_arg)?;

    match command {
        Commands::Report => {
            let cell = read_cell()?;
            match cell::report(&cell, &config.tools) {
                Report::Issues(text) => println!("{}", text),
                Report::Clean => log::info!("No issues found. Code is clean."),
                Report::Failed(reason) => log::error!("Lint failed: {}", reason),
            }
        }

        Commands::Fix => {
            let cell = read_cell()?;
            match cell::check_fix(&cell, &config.tools) {
                CommandOutcome::Success(fixed) => println!("{}", fixed),
                CommandOutcome::Empty | CommandOutcome::Failed(_) => {
                    log::info!("No changes applied.");
                    print!("{}", cell);
                }
            }
        }

        Commands::Format => {
            let cell = read_cell()?;
            match cell::format(&cell, &config.tools) {
                FormatResult::Changed(code) => println!("{}", code),
                FormatResult::Unchanged => {
                    log::info!("Code already formatted. No changes needed.");
                    print!("{}", cell);
                }
                FormatResult::Failed(reason) => {
                    log::error!("Formatting failed: {}", reason);
                    print!("{}", cell);
                }
            }
        }

        Commands::Sql { var } => {
            let cell = read_cell()?;
            match cell::reformat_sql(&cell, &var, &config.tools) {
                SqlOutcome::Reformatted(code) => println!("{}", code),
                SqlOutcome::NoMatch => {
                    log::warn!("No string assignment to '{}' found.", var);
                    print!("{}", cell);
                }
                SqlOutcome::Failed(reason) => {
                    log::error!("SQL formatting failed: {}", reason);
                    print!("{}", cell);
                }
            }
        }

        Commands::PreRun { fix, format } => {
            let cell = read_cell()?;
            let context = LinterContext::new(config, None)?;
            let mut shell = Shell::new(context);
            if fix {
                shell.run_command("auto fix", None);
            }
            if format {
                shell.run_command("auto format", None);
            }
            let pending = shell.pre_run_cell(&cell);
            if pending.was_rewritten() {
                log::info!("Cell rewritten by {}", pending.rewritten_by.join(", "));
            }
            print!("{}", pending.source);
            std::io::stdout().flush()?;
        }

        Commands::Cl { line, connection_file } => {
            let line = line.join(" ");
            if shell::needs_live_shell(&line) {
                log::error!(
                    "`cl {}` only works inside a long-lived host. Use `colablint pre-run --fix` or `--format` per cell.",
                    line
                );
                std::process::exit(2);
            }
            let needs_cell = !matches!(
                line.split_whitespace().next(),
                None | Some("help" | "fullcheck")
            );
            let cell = if needs_cell { Some(read_cell()?) } else { None };

            let context = LinterContext::new(config, connection_file)?;
            let mut shell = Shell::new(context);
            let reply = shell.run_command(&line, cell.as_deref());
            for printed in &reply.printed {
                println!("{}", printed);
            }
            if let Some(code) = reply.replacement {
                println!("# Updated Code (Copy & Paste Below)");
                println!("{}", code);
            }
        }

        Commands::Check { connection_file } => {
            let mut context = LinterContext::new(config, connection_file)?;
            match context.check_notebook() {
                Ok((path, report)) => {
                    log::info!("File path found: {}", path.display());
                    println!("---- Notebook Quality & Style Check Report ----");
                    match report {
                        Report::Issues(text) => println!("{}", text),
                        Report::Clean => println!("No issues found in the entire notebook. Code is clean."),
                        Report::Failed(reason) => log::error!("Check full failed: {}", reason),
                    }
                    println!("-------------------------------------------------------------");
                }
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Locate { connection_file } => {
            let mut context = LinterContext::new(config, connection_file)?;
            match context.locate() {
                Ok(identity) => println!("{}", serde_json::to_string_pretty(identity)?),
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::InitConfig { force } => init_config(config_arg, force)?,

        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
