//! CLI execution and command dispatch logic.
//!
//! `main` stays minimal: it parses the command line, installs logging and
//! hands over to [`run`]. Command output goes to stdout; diagnostics go
//! through `tracing` to stderr.

mod error;

pub use error::RunnerError;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::debug;

use crate::cli::{Cli, Commands, PathOp, StyleArg};
use crate::deps::DependencyReporter;
use crate::dircache::DirCache;
use crate::glob::{GlobSet, Globber, glob_match};
use crate::path::{CaseSensitivity, Path, PathStyle};
use crate::pool::WorkerPool;

/// Root used when `-C` is not given.
pub const DEFAULT_ROOT: &str = ".";

/// Execute the parsed command, writing results to stdout.
///
/// # Errors
///
/// Returns an error when the glob root is missing, the worker pool cannot
/// start, or stdout cannot be written.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = run_with(cli, &mut out)?;
    out.flush().context("flush stdout")?;
    Ok(code)
}

/// Execute the parsed command, writing results to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with(cli: &Cli, out: &mut dyn Write) -> Result<ExitCode> {
    Ok(if execute(cli, out)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run the command and report whether it succeeded.
fn execute(cli: &Cli, out: &mut dyn Write) -> Result<bool> {
    match &cli.command {
        Commands::Glob { patterns } => {
            let paths = expand(cli, patterns)?;
            for path in paths {
                writeln!(out, "{path}").context("write match")?;
            }
            Ok(true)
        }
        Commands::Match {
            name,
            pattern,
            ignore_case,
        } => {
            let case = if *ignore_case {
                CaseSensitivity::Insensitive
            } else {
                CaseSensitivity::Sensitive
            };
            let matched = glob_match(name, pattern, case);
            writeln!(out, "{matched}").context("write match result")?;
            Ok(matched)
        }
        Commands::Path { op, path, style } => {
            for line in path_op(*op, Path::with_style(path, path_style(*style))) {
                writeln!(out, "{line}").context("write path")?;
            }
            Ok(true)
        }
    }
}

/// Expand `patterns` under the configured root, reporting every listed
/// directory to the parent build system.
///
/// # Errors
///
/// Fails when the root is not a directory or the worker pool cannot start.
pub fn expand(cli: &Cli, patterns: &[String]) -> Result<Vec<String>> {
    let root = resolve_root(cli.directory.as_deref())?;
    let reporter = Arc::new(DependencyReporter::from_env());
    debug!(root, parent = reporter.has_parent(), "resolving globs");

    let cache = Arc::new(DirCache::new().with_reporter(reporter));
    let globber = match worker_count(cli) {
        Some(threads) => {
            let pool = WorkerPool::new(threads).context("start worker pool")?;
            Globber::new(cache).with_pool(Arc::new(pool))
        }
        None => Globber::new(cache),
    };

    let set = GlobSet::new();
    set.extend(&globber, root, patterns.iter().map(String::as_str));
    Ok(set.to_vec())
}

fn resolve_root(directory: Option<&str>) -> Result<&str, RunnerError> {
    let root = directory.unwrap_or(DEFAULT_ROOT);
    if Utf8Path::new(root).is_dir() {
        Ok(root)
    } else {
        Err(RunnerError::RootNotFound {
            path: root.to_owned(),
        })
    }
}

/// Threads to expand with, or `None` to stay on the calling thread.
fn worker_count(cli: &Cli) -> Option<usize> {
    if cli.serial {
        return None;
    }
    Some(cli.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }))
}

const fn path_style(style: StyleArg) -> PathStyle {
    match style {
        StyleArg::Native => PathStyle::native(),
        StyleArg::Posix => PathStyle::Posix,
        StyleArg::Windows => PathStyle::Windows,
    }
}

fn path_op(op: PathOp, path: Path<'_>) -> Vec<String> {
    match op {
        PathOp::Norm => vec![path.normalize()],
        PathOp::Split => {
            let split = path.split();
            vec![split.head.to_string(), split.tail.to_string()]
        }
        PathOp::Components => path
            .components()
            .iter()
            .map(ToString::to_string)
            .collect(),
        PathOp::Ext => vec![path.extension().to_string()],
        PathOp::Root => vec![path.root().to_string()],
    }
}

#[cfg(test)]
mod tests;
