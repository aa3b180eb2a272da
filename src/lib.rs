//! Globbing and implicit dependency reporting for build scripts.
//!
//! A build script run under a parent build system often needs to expand
//! patterns such as `src/**/*.c`. Every directory listed while doing so is
//! an implicit input of the script: when it changes, the script must run
//! again. This crate provides:
//!
//! - [`path`]: a borrowed path algebra for POSIX and Windows syntax;
//! - [`dircache`]: memoised directory listings that report each directory
//!   the first time it is listed;
//! - [`glob`]: pattern expansion, optionally spread over a [`pool`];
//! - [`deps`]: the binary record stream consumed by the parent;
//! - [`rules`]: streaming JSON emission of build rules.

pub mod cli;
pub mod deps;
pub mod dircache;
pub mod glob;
pub mod path;
pub mod pool;
pub mod rules;
pub mod runner;
