//! Command line interface definition using clap.
//!
//! This file is also compiled by `build.rs` to render the manual page, so it
//! depends only on `clap` and `deps_env`.

use clap::{Parser, Subcommand, ValueEnum};

/// Maximum number of worker threads accepted by the CLI.
const MAX_JOBS: usize = 64;

fn parse_jobs(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("{s} is not a valid number"))?;
    if (1..=MAX_JOBS).contains(&value) {
        Ok(value)
    } else {
        Err(format!("jobs must be between 1 and {MAX_JOBS}"))
    }
}

/// Expand build-script globs and report the directories they consult.
#[derive(Debug, Parser)]
#[command(name = "depglob", author, version, about, long_about = None)]
pub struct Cli {
    /// Resolve patterns relative to this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<String>,

    /// Number of worker threads used to expand globs.
    #[arg(short, long, value_name = "N", value_parser = parse_jobs, env = deps_env::JOBS_ENV)]
    pub jobs: Option<usize>,

    /// Expand globs on the calling thread only.
    #[arg(long)]
    pub serial: bool,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Print every path matched by the patterns, sorted and de-duplicated.
    ///
    /// Patterns apply in order; one starting with `!` removes its matches
    /// from the result so far.
    Glob {
        /// Patterns such as `src/**/*.c` or `!src/generated.c`.
        #[arg(value_name = "PATTERN", required = true, allow_hyphen_values = true)]
        patterns: Vec<String>,
    },

    /// Test a single name against a single-component pattern.
    ///
    /// Prints `true` and exits 0 on a match, prints `false` and exits 1
    /// otherwise.
    Match {
        /// Name to test.
        name: String,
        /// Pattern using `?`, `*` and `[...]`.
        pattern: String,
        /// Compare ASCII letters without regard to case.
        #[arg(short, long)]
        ignore_case: bool,
    },

    /// Apply a path operation and print the result.
    Path {
        /// Operation to apply.
        #[arg(value_enum)]
        op: PathOp,
        /// Path to operate on.
        path: String,
        /// Path syntax to use.
        #[arg(long, value_enum, default_value_t = StyleArg::Native)]
        style: StyleArg,
    },
}

/// Path operations exposed by the `path` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathOp {
    /// Resolve `.` and `..` and canonicalise separators.
    Norm,
    /// Print the directory part and the final component on two lines.
    Split,
    /// Print each component on its own line.
    Components,
    /// Print the extension, including its dot.
    Ext,
    /// Print the root, empty for relative paths.
    Root,
}

/// Path syntax selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    /// The host platform's syntax.
    #[default]
    Native,
    /// `/`-separated, case-sensitive paths.
    Posix,
    /// Drive letters, UNC shares and case-insensitive names.
    Windows,
}
