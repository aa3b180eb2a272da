//! Component-by-component traversal for a single glob pattern.

use std::sync::Arc;

use super::MatchSink;
use super::matcher::{glob_match, is_glob_pattern, is_recursive_glob};
use crate::dircache::{DirCache, PathKind, path_kind};
use crate::path::{Path, join};
use crate::pool::Spawner;

/// State shared by every branch of one expansion.
pub(super) struct Walk {
    pub(super) cache: Arc<DirCache>,
    pub(super) root: String,
    pub(super) components: Vec<String>,
    pub(super) match_dirs: bool,
    pub(super) sink: Arc<dyn MatchSink>,
    pub(super) spawner: Option<Spawner>,
}

impl Walk {
    /// Match component `index` against the directory `path`.
    ///
    /// `path` is restored to its original length before returning.
    pub(super) fn step(self: &Arc<Self>, path: &mut String, index: usize) {
        let Some(component) = self.components.get(index) else {
            return;
        };
        let last = index + 1 == self.components.len();
        if is_recursive_glob(component) {
            self.recursive(path, index, last);
        } else if is_glob_pattern(component) {
            self.wildcard(path, component, index, last);
        } else {
            self.literal(path, component, index, last);
        }
    }

    fn recursive(self: &Arc<Self>, path: &mut String, index: usize, last: bool) {
        // A trailing `**/` matched zero levels: the directory itself counts,
        // but a literal prefix has not been seen in any listing yet.
        if last
            && self.match_dirs
            && !path.is_empty()
            && self.kind_of(path) == PathKind::Dir
        {
            self.sink.accept(path, true);
        }
        self.descend(path, index + 1);

        let listing = self.cache.entries_in(&self.root, path);
        let base = path.len();
        for entry in listing.iter() {
            self.push(path, &entry.name);
            if last && !self.match_dirs && !entry.is_dir {
                self.sink.accept(path, false);
            }
            if entry.is_dir {
                self.descend(path, index);
            }
            path.truncate(base);
        }
    }

    fn wildcard(self: &Arc<Self>, path: &mut String, pattern: &str, index: usize, last: bool) {
        let case = self.cache.style().case_sensitivity();
        let listing = self.cache.entries_in(&self.root, path);
        let base = path.len();
        for entry in listing
            .iter()
            .filter(|entry| glob_match(&entry.name, pattern, case))
        {
            self.push(path, &entry.name);
            if last {
                if entry.is_dir == self.match_dirs {
                    self.sink.accept(path, entry.is_dir);
                }
            } else if entry.is_dir {
                self.descend(path, index + 1);
            }
            path.truncate(base);
        }
    }

    fn literal(self: &Arc<Self>, path: &mut String, component: &str, index: usize, last: bool) {
        let base = path.len();
        self.push(path, component);
        if last {
            // A literal only matches if it exists with the wanted kind.
            let wanted = if self.match_dirs {
                PathKind::Dir
            } else {
                PathKind::File
            };
            if self.kind_of(path) == wanted {
                self.sink.accept(path, self.match_dirs);
            }
        } else {
            self.descend(path, index + 1);
        }
        path.truncate(base);
    }

    /// Continue with component `index` below `path`, on the pool when there
    /// is one. Pool tasks get their own copy of the path.
    fn descend(self: &Arc<Self>, path: &mut String, index: usize) {
        if index >= self.components.len() {
            return;
        }
        let Some(spawner) = &self.spawner else {
            self.step(path, index);
            return;
        };
        let walk = Arc::clone(self);
        let mut owned = path.clone();
        spawner.enqueue(move || walk.step(&mut owned, index));
    }

    fn kind_of(&self, path: &str) -> PathKind {
        path_kind(&join(self.cache.style(), [self.root.as_str(), path]))
    }

    fn push(&self, path: &mut String, name: &str) {
        Path::with_style(name, self.cache.style()).join_onto(path);
    }
}
