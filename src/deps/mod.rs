//! Reporting implicit dependencies to a parent build system.
//!
//! When a parent build system spawns this process it exports the numbers of
//! two inherited channels, one for inputs and one for outputs (see
//! [`deps_env`]). Every directory the glob engine lists is sent back as an
//! input so the parent can re-run the build script when the directory
//! changes. Without a parent every report is a no-op, and write failures
//! are never surfaced.
//!
//! # Examples
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use std::io::Write;
//! use depglob::deps::{Dependency, DependencyReporter};
//!
//! #[derive(Clone, Default)]
//! struct Capture(Arc<Mutex<Vec<u8>>>);
//!
//! impl Write for Capture {
//!     fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
//!         self.0.lock().map_err(|_| std::io::ErrorKind::Other)?.extend_from_slice(buf);
//!         Ok(buf.len())
//!     }
//!     fn flush(&mut self) -> std::io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let capture = Capture::default();
//! let reporter = DependencyReporter::from_writers(Some(Box::new(capture.clone())), None);
//! reporter.add_input_name("src");
//!
//! let bytes = capture.0.lock().map(|buf| buf.clone()).unwrap_or_default();
//! let records = Dependency::decode_all(&bytes)?;
//! assert_eq!(records, vec![Dependency::named("src")]);
//! # Ok::<(), depglob::deps::RecordError>(())
//! ```

use std::fmt;
use std::io::Write;

use deps_env::{INPUTS_ENV, OUTPUTS_ENV};
use tracing::trace;

mod channel;
mod record;

use channel::Channel;
pub use record::{CHECKSUM_LEN, Dependency, HEADER_LEN, RecordError, Status};

/// Sends dependency records to the parent, if there is one.
pub struct DependencyReporter {
    inputs: Option<Channel>,
    outputs: Option<Channel>,
}

impl DependencyReporter {
    /// Open the channels advertised in the environment.
    ///
    /// Missing, zero or unparsable variables disable the matching channel,
    /// as does a descriptor that cannot be opened.
    #[must_use]
    pub fn from_env() -> Self {
        let reporter = Self {
            inputs: channel::from_env(INPUTS_ENV),
            outputs: channel::from_env(OUTPUTS_ENV),
        };
        trace!(parent = reporter.has_parent(), "dependency reporter ready");
        reporter
    }

    /// Report into arbitrary writers instead of inherited channels.
    #[must_use]
    pub fn from_writers(
        inputs: Option<Box<dyn Write + Send>>,
        outputs: Option<Box<dyn Write + Send>>,
    ) -> Self {
        Self {
            inputs: inputs.map(|sink| Channel::new(INPUTS_ENV, sink)),
            outputs: outputs.map(|sink| Channel::new(OUTPUTS_ENV, sink)),
        }
    }

    /// A reporter with no parent; every report is discarded.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            inputs: None,
            outputs: None,
        }
    }

    /// Return `true` when at least one channel is open.
    #[must_use]
    pub const fn has_parent(&self) -> bool {
        self.inputs.is_some() || self.outputs.is_some()
    }

    /// Report a fully populated input record.
    pub fn add_input(&self, dependency: &Dependency) {
        if let Some(channel) = &self.inputs {
            channel.send(&dependency.encode());
        }
    }

    /// Report a fully populated output record.
    pub fn add_output(&self, dependency: &Dependency) {
        if let Some(channel) = &self.outputs {
            channel.send(&dependency.encode());
        }
    }

    /// Report an input by name alone.
    pub fn add_input_name(&self, name: impl AsRef<[u8]>) {
        if let Some(channel) = &self.inputs {
            send_named(channel, name.as_ref());
        }
    }

    /// Report an output by name alone.
    pub fn add_output_name(&self, name: impl AsRef<[u8]>) {
        if let Some(channel) = &self.outputs {
            send_named(channel, name.as_ref());
        }
    }
}

fn send_named(channel: &Channel, name: &[u8]) {
    trace!(
        channel = channel.label(),
        name = %String::from_utf8_lossy(name),
        "reporting dependency"
    );
    channel.send(&record::encode_parts(
        Status::Unknown,
        &[0; CHECKSUM_LEN],
        name,
    ));
}

impl Default for DependencyReporter {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl fmt::Debug for DependencyReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyReporter")
            .field("inputs", &self.inputs.as_ref().map(Channel::label))
            .field("outputs", &self.outputs.as_ref().map(Channel::label))
            .finish()
    }
}
