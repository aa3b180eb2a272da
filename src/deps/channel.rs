//! Inherited output channels named by environment variables.

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, trace};

type Sink = Box<dyn Write + Send>;

/// One append-only stream to the parent. Each record is written while
/// holding the channel lock so records from different threads never
/// interleave.
pub(super) struct Channel {
    label: &'static str,
    sink: Mutex<Sink>,
}

impl Channel {
    pub(super) fn new(label: &'static str, sink: Sink) -> Self {
        Self {
            label,
            sink: Mutex::new(sink),
        }
    }

    pub(super) fn send(&self, record: &[u8]) {
        let mut sink = self.lock();
        let written = sink.write_all(record).and_then(|()| sink.flush());
        drop(sink);
        if let Err(err) = written {
            debug!(channel = self.label, error = %err, "dependency record not delivered");
        }
    }

    pub(super) const fn label(&self) -> &'static str {
        self.label
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Open the channel named by `var`, if the parent provided one.
pub(super) fn from_env(var: &'static str) -> Option<Channel> {
    let value = env::var(var).ok()?;
    let Some(id) = parse_descriptor(&value) else {
        debug!(var, value = %value, "ignoring unusable channel descriptor");
        return None;
    };
    match open_descriptor(id) {
        Ok(file) => {
            trace!(var, id, "opened dependency channel");
            Some(Channel::new(var, Box::new(file)))
        }
        Err(err) => {
            debug!(var, id, error = %err, "failed to open dependency channel");
            None
        }
    }
}

/// Parse a descriptor number; zero and garbage both mean "no channel".
pub(super) fn parse_descriptor(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|id| *id > 0)
}

#[cfg(unix)]
fn open_descriptor(id: u64) -> io::Result<File> {
    std::fs::OpenOptions::new()
        .append(true)
        .open(format!("/dev/fd/{id}"))
}

#[cfg(windows)]
fn open_descriptor(id: u64) -> io::Result<File> {
    use std::ffi::c_void;
    use std::os::windows::io::FromRawHandle;

    let raw = usize::try_from(id)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "handle out of range"))?;
    let handle = std::ptr::with_exposed_provenance_mut::<c_void>(raw);
    // SAFETY: the parent hands this process ownership of an inherited, open
    // handle through the environment and nothing else in the process uses it.
    Ok(unsafe { File::from_raw_handle(handle) })
}

#[cfg(not(any(unix, windows)))]
fn open_descriptor(_id: u64) -> io::Result<File> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "inherited channels are not supported on this platform",
    ))
}
