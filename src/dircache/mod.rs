//! Memoised directory listings.
//!
//! Each directory is listed at most once per [`DirCache`]; later lookups
//! return the same shared listing without touching the filesystem. The
//! first listing of a directory is reported to the parent build system as an
//! implicit input.
//!
//! Lookup keys are normalised, so `src`, `./src` and `src//` share one
//! entry and one report. The whole check-then-list sequence runs under a
//! single lock: a miss in one thread blocks every other lookup until the
//! listing is stored, and no caller ever observes a partial listing.

use std::collections::HashMap;
use std::slice;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use crate::deps::DependencyReporter;
use crate::path::{self, Path, PathStyle};

mod listing;

/// One name inside a listed directory.
///
/// Entries sort by name, then with files before directories.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirEntry {
    /// File name without any directory part.
    pub name: String,
    /// Whether the entry is a directory. Symbolic links are never
    /// directories here, even when they point at one.
    pub is_dir: bool,
}

/// A sorted directory listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirEntries(Vec<DirEntry>);

impl DirEntries {
    /// Iterate over the entries in order.
    pub fn iter(&self) -> slice::Iter<'_, DirEntry> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` for an empty (or unreadable) directory.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[DirEntry] {
        &self.0
    }
}

impl From<Vec<DirEntry>> for DirEntries {
    fn from(mut entries: Vec<DirEntry>) -> Self {
        entries.sort();
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a DirEntries {
    type Item = &'a DirEntry;
    type IntoIter = slice::Iter<'a, DirEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// What a path refers to, without following a final symbolic link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Missing, unreadable, a symbolic link or a special file.
    Unknown,
    /// A regular file.
    File,
    /// A directory.
    Dir,
}

/// Classify a filesystem path.
#[must_use]
pub fn path_kind(path: &str) -> PathKind {
    listing::path_kind(path)
}

/// Thread-safe cache of directory listings.
#[derive(Debug, Default)]
pub struct DirCache {
    listings: Mutex<HashMap<String, Arc<DirEntries>>>,
    reporter: Option<Arc<DependencyReporter>>,
    style: PathStyle,
}

impl DirCache {
    /// An empty cache that reports nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every newly listed directory through `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<DependencyReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Normalise keys with `style` instead of the host conventions.
    #[must_use]
    pub const fn with_style(mut self, style: PathStyle) -> Self {
        self.style = style;
        self
    }

    /// Path conventions used for keys.
    #[must_use]
    pub const fn style(&self) -> PathStyle {
        self.style
    }

    /// The sorted listing of `dir`, reading the filesystem only on the first
    /// request for the normalised path.
    ///
    /// An unreadable or missing directory yields an empty listing, which is
    /// cached like any other.
    #[must_use]
    pub fn entries(&self, dir: &str) -> Arc<DirEntries> {
        let key = Path::with_style(dir, self.style).normalize();
        let mut listings = self.lock();
        if let Some(cached) = listings.get(&key) {
            trace!(dir = %key, "listing cache hit");
            return Arc::clone(cached);
        }
        if let Some(reporter) = &self.reporter {
            reporter.add_input_name(&key);
        }
        let listing = Arc::new(listing::read_dir(&key));
        listings.insert(key, Arc::clone(&listing));
        listing
    }

    /// The listing of `dir` resolved against `root`.
    #[must_use]
    pub fn entries_in(&self, root: &str, dir: &str) -> Arc<DirEntries> {
        self.entries(&path::join(self.style, [root, dir]))
    }

    /// Number of directories cached so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` before the first listing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<DirEntries>>> {
        match self.listings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests;
