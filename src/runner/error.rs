//! Error types for the runner module.
//!
//! Kept in a submodule so the lint suppression below stays narrow: the
//! `unused_assignments` lint fires in some Rust versions on code expanded
//! from the thiserror/miette derives.

// `#[expect]` would fail on toolchains where the lint does not fire.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while executing a command.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The directory given with `-C` does not exist or is not a directory.
    #[error("glob root `{path}` is not a directory")]
    #[diagnostic(
        code(depglob::runner::root_not_found),
        help("pass an existing directory to -C/--directory")
    )]
    RootNotFound {
        /// The directory that was requested.
        path: String,
    },
}
