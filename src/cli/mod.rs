//! The harness command-line interface.
//!
//! This module is the entry point for all CLI commands: it loads the config
//! and catalog, dispatches the subcommand, and maps the outcome to an exit code.

use crate::catalog::FixtureCatalog;
use crate::cli::args::{Command, HarnessArgs, ReportFormat};
use crate::config::HarnessConfig;
use crate::errors::SuiteError;
use crate::normalize::normalize;
use crate::suite::{SuiteDriver, SuiteOptions, SuiteSummary};
use clap::Parser;
use miette::IntoDiagnostic;
use std::path::Path;
use std::{fs, io::Write, process};

pub mod args;
pub mod output;

/// Every fixture passed (or was skipped).
pub const EXIT_OK: i32 = 0;
/// At least one fixture failed or errored.
pub const EXIT_FAILURES: i32 = 1;
/// The harness itself could not start: bad config, catalog, or I/O.
pub const EXIT_USAGE: i32 = 2;

/// The main entry point for the CLI.
pub fn run() {
    let args = HarnessArgs::parse();
    init_logging(args.verbose);

    let code = match dispatch(args) {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{:?}", report);
            EXIT_USAGE
        }
    };
    process::exit(code);
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

fn dispatch(args: HarnessArgs) -> miette::Result<i32> {
    let mut config = HarnessConfig::discover(args.config.as_deref())?;

    match args.command {
        Command::Run {
            catalog,
            filter,
            fail_fast,
            work_dir,
            header_lines,
            timeout_ms,
            format,
        } => {
            if let Some(work_dir) = work_dir {
                config.work_dir = work_dir;
            }
            if let Some(header_lines) = header_lines {
                config.header_lines = header_lines;
            }
            if let Some(timeout_ms) = timeout_ms {
                config.timeout_ms = timeout_ms;
            }
            config.fail_fast |= fail_fast;
            config.validate()?;

            let catalog = load_catalog(catalog.as_deref())?;
            let options = SuiteOptions {
                filter,
                fail_fast: config.fail_fast,
            };
            handle_run(&config, &catalog, options, format, args.no_color)
        }
        Command::List { catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let stdout = std::io::stdout();
            output::print_catalog(&mut stdout.lock(), &catalog).into_diagnostic()?;
            Ok(EXIT_OK)
        }
        Command::Normalize { file, header_lines } => {
            let bytes = fs::read(&file).into_diagnostic()?;
            let raw = String::from_utf8_lossy(&bytes);
            let lines = normalize(&raw, header_lines.unwrap_or(config.header_lines));
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for line in lines {
                writeln!(out, "{}", line).into_diagnostic()?;
            }
            Ok(EXIT_OK)
        }
    }
}

fn load_catalog(path: Option<&Path>) -> miette::Result<FixtureCatalog> {
    match path {
        Some(path) => Ok(FixtureCatalog::load(path)?),
        None => Ok(FixtureCatalog::builtin()),
    }
}

/// Handles the `run` subcommand.
fn handle_run(
    config: &HarnessConfig,
    catalog: &FixtureCatalog,
    options: SuiteOptions,
    format: ReportFormat,
    no_color: bool,
) -> miette::Result<i32> {
    let driver = SuiteDriver::new(config, options);
    let (verdicts, stopped_at) = match driver.run_all(catalog) {
        Ok(verdicts) => (verdicts, None),
        Err(SuiteError::StrictFailure { verdict, completed }) => {
            (completed, Some(verdict.fixture_name))
        }
    };

    match format {
        ReportFormat::Human => {
            let mut stdout = output::stdout(no_color);
            output::print_report(&mut stdout, &verdicts).into_diagnostic()?;
        }
        ReportFormat::Json => {
            println!("{}", output::json_report(&verdicts).into_diagnostic()?);
        }
    }
    if let Some(name) = stopped_at {
        eprintln!("stopped after `{}` (fail-fast)", name);
    }

    if SuiteSummary::from_verdicts(&verdicts).success() {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_FAILURES)
    }
}
