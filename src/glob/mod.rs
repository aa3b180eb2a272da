//! Glob expansion over cached directory listings.
//!
//! A pattern is split into path components and matched one directory level
//! at a time:
//!
//! - `**` matches zero or more directories;
//! - a component containing `?`, `*` or `[` is matched against each entry of
//!   the current directory with [`glob_match`];
//! - any other component is appended literally without listing anything.
//!
//! A pattern ending in a separator matches only directories; otherwise only
//! files match. Matches are delivered to a [`MatchSink`] as paths relative
//! to the root (or absolute, for absolute patterns).
//!
//! With a [`WorkerPool`] attached, every descent into a subdirectory becomes
//! a pool task that owns its own copy of the path built so far, and
//! [`Globber::glob`] returns only after the pool drains. Matches then arrive
//! in no particular order.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use depglob::dircache::DirCache;
//! use depglob::glob::{GlobSet, Globber};
//!
//! let globber = Globber::new(Arc::new(DirCache::new()));
//! let set = GlobSet::new();
//! set.extend(&globber, ".", ["src/**/*.rs", "!src/main.rs"]);
//! for path in set.to_vec() {
//!     println!("{path}");
//! }
//! ```

use std::sync::{Arc, mpsc};

use tracing::{debug, trace};

use crate::dircache::DirCache;
use crate::path::Path;
use crate::pool::WorkerPool;

mod collect;
mod matcher;
mod walk;

pub use collect::GlobSet;
pub use matcher::{glob_match, is_glob_pattern, is_recursive_glob};

/// One path produced by a glob.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobMatch {
    /// Matched path, relative to the glob root for relative patterns.
    pub path: String,
    /// Whether the match is a directory.
    pub is_dir: bool,
}

/// Receives matches as they are found, possibly from several threads.
pub trait MatchSink: Send + Sync {
    /// Called once per match.
    fn accept(&self, path: &str, is_dir: bool);
}

impl<F> MatchSink for F
where
    F: Fn(&str, bool) + Send + Sync,
{
    fn accept(&self, path: &str, is_dir: bool) {
        self(path, is_dir);
    }
}

impl MatchSink for mpsc::Sender<GlobMatch> {
    fn accept(&self, path: &str, is_dir: bool) {
        let found = GlobMatch {
            path: path.to_owned(),
            is_dir,
        };
        if self.send(found).is_err() {
            trace!(path, "match receiver gone");
        }
    }
}

/// Expands patterns against the filesystem through a shared [`DirCache`].
#[derive(Clone, Debug)]
pub struct Globber {
    cache: Arc<DirCache>,
    pool: Option<Arc<WorkerPool>>,
}

impl Globber {
    /// A globber that walks directories on the calling thread.
    #[must_use]
    pub const fn new(cache: Arc<DirCache>) -> Self {
        Self { cache, pool: None }
    }

    /// Fan directory descents out over `pool`.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// The cache backing this globber.
    #[must_use]
    pub const fn cache(&self) -> &Arc<DirCache> {
        &self.cache
    }

    /// Expand `pattern` relative to `root`, sending each match to `sink`.
    ///
    /// Blocks until the whole expansion has finished. Must not be called
    /// from a task running on this globber's own pool.
    pub fn glob(&self, root: &str, pattern: &str, sink: Arc<dyn MatchSink>) {
        let pattern_path = Path::with_style(pattern, self.cache.style());
        let match_dirs = pattern_path.basename().is_empty();
        let components = pattern_path
            .components()
            .iter()
            .map(|component| component.as_str().to_owned())
            .collect();
        debug!(
            root,
            pattern,
            match_dirs,
            parallel = self.pool.is_some(),
            "expanding glob"
        );
        let walk = Arc::new(walk::Walk {
            cache: Arc::clone(&self.cache),
            root: root.to_owned(),
            components,
            match_dirs,
            sink,
            spawner: self.pool.as_ref().map(|pool| pool.spawner()),
        });
        walk.step(&mut String::new(), 0);
        if let Some(pool) = &self.pool {
            pool.drain();
        }
    }

    /// Expand `pattern` and return the matches sorted by path.
    #[must_use]
    pub fn matches(&self, root: &str, pattern: &str) -> Vec<GlobMatch> {
        let (sender, receiver) = mpsc::channel();
        self.glob(root, pattern, Arc::new(sender));
        let mut found: Vec<GlobMatch> = receiver.into_iter().collect();
        found.sort();
        found
    }
}

#[cfg(test)]
mod tests;
