//! Ordered include/exclude collection of glob results.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Globber, MatchSink};

type Paths = Arc<Mutex<BTreeSet<String>>>;

fn lock(paths: &Paths) -> MutexGuard<'_, BTreeSet<String>> {
    match paths.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

struct Include(Paths);

impl MatchSink for Include {
    fn accept(&self, path: &str, _is_dir: bool) {
        lock(&self.0).insert(path.to_owned());
    }
}

struct Exclude(Paths);

impl MatchSink for Exclude {
    fn accept(&self, path: &str, _is_dir: bool) {
        lock(&self.0).remove(path);
    }
}

/// Sorted, de-duplicated union of several glob expansions.
///
/// Patterns apply in order. A pattern starting with `!` removes its matches
/// from whatever earlier patterns added; it cannot pre-empt later ones.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use depglob::dircache::DirCache;
/// use depglob::glob::{GlobSet, Globber};
///
/// let globber = Globber::new(Arc::new(DirCache::new()));
/// let set = GlobSet::new();
/// set.apply(&globber, "/proj", "src/*");
/// set.apply(&globber, "/proj", "!src/b.h");
/// assert_eq!(set.to_vec(), ["src/a.c"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GlobSet {
    paths: Paths,
}

impl GlobSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand one pattern into the set, or out of it for `!pattern`.
    ///
    /// An empty `root` means the current directory.
    pub fn apply(&self, globber: &Globber, root: &str, pattern: &str) {
        let base = if root.is_empty() { "." } else { root };
        let (expression, sink) = pattern.strip_prefix('!').map_or_else(
            || (pattern, self.includer()),
            |excluded| (excluded, self.excluder()),
        );
        globber.glob(base, expression, sink);
    }

    fn includer(&self) -> Arc<dyn MatchSink> {
        Arc::new(Include(Arc::clone(&self.paths)))
    }

    fn excluder(&self) -> Arc<dyn MatchSink> {
        Arc::new(Exclude(Arc::clone(&self.paths)))
    }

    /// Apply each pattern in turn.
    pub fn extend<'p>(
        &self,
        globber: &Globber,
        root: &str,
        patterns: impl IntoIterator<Item = &'p str>,
    ) {
        for pattern in patterns {
            self.apply(globber, root, pattern);
        }
    }

    /// Return `true` when `path` is in the set.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        lock(&self.paths).contains(path)
    }

    /// Number of paths in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.paths).len()
    }

    /// Return `true` when no path has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.paths).is_empty()
    }

    /// The collected paths in sorted order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        lock(&self.paths).iter().cloned().collect()
    }
}
