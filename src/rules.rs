//! Streaming JSON emission of build rules.
//!
//! Rules are written as one JSON array, one element per line, so a parent
//! build system can start reading before the script finishes:
//!
//! ```text
//! [
//!     {"inputs":["main.c"],"task":["cc","-c","main.c"],"outputs":["main.o"]}
//! ]
//! ```

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One build step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Files the task reads.
    pub inputs: Vec<String>,
    /// Command line to run, program first.
    pub task: Vec<String>,
    /// Files the task writes.
    pub outputs: Vec<String>,
    /// Working directory for the task, if not the build root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Short description shown instead of the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Errors raised while writing rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The underlying writer failed.
    #[error("failed to write rules: {0}")]
    Io(#[from] io::Error),
    /// A rule could not be serialised.
    #[error("failed to serialise rule: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes rules into a JSON array as they are added.
///
/// Call [`RuleWriter::finish`] to close the array; dropping the writer
/// leaves the output incomplete.
#[derive(Debug)]
pub struct RuleWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> RuleWriter<W> {
    /// Open the array.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Io`] when the opening bracket cannot be written.
    pub fn new(mut out: W) -> Result<Self, RuleError> {
        out.write_all(b"[")?;
        Ok(Self { out, written: 0 })
    }

    /// Append one rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] when writing or serialisation fails.
    pub fn add(&mut self, rule: &Rule) -> Result<(), RuleError> {
        if self.written > 0 {
            self.out.write_all(b",")?;
        }
        self.out.write_all(b"\n    ")?;
        serde_json::to_writer(&mut self.out, rule)?;
        self.written += 1;
        Ok(())
    }

    /// Number of rules written so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.written
    }

    /// Return `true` before the first rule.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Close the array, flush, and hand back the writer.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Io`] when the closing bracket cannot be written
    /// or the flush fails.
    pub fn finish(mut self) -> Result<W, RuleError> {
        self.out.write_all(b"\n]\n")?;
        self.out.flush()?;
        Ok(self.out)
    }
}
