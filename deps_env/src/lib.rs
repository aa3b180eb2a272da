#![forbid(unsafe_code)]

//! Shared environment constants used across depglob crates (library, tests,
//! and the build script).
//!
//! The parent build system exports the dependency channel identifiers before
//! spawning a child; the child reads them back to find where implicit inputs
//! and outputs should be reported.

/// Environment variable naming the inherited channel for implicit inputs.
///
/// The value is a file descriptor number on Unix and a handle number on
/// Windows.
///
/// # Examples
///
/// ```
/// use deps_env::INPUTS_ENV;
/// assert_eq!(INPUTS_ENV, "BUTTON_INPUTS");
/// ```
pub const INPUTS_ENV: &str = "BUTTON_INPUTS";

/// Environment variable naming the inherited channel for implicit outputs.
pub const OUTPUTS_ENV: &str = "BUTTON_OUTPUTS";

/// Environment variable overriding the number of glob worker threads.
pub const JOBS_ENV: &str = "DEPGLOB_JOBS";
