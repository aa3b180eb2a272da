//! Throwaway directory trees for glob and cache tests.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tempfile::TempDir;

/// A temporary directory populated through relative paths.
///
/// The directory is removed when the `Tree` is dropped.
#[derive(Debug)]
pub struct Tree {
    root: Utf8PathBuf,
    dir: Dir,
    _temp: TempDir,
}

impl Tree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Fails when the temporary directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("create temporary directory")?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| anyhow!("temporary path {} is not UTF-8", path.display()))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .with_context(|| format!("open {root}"))?;
        Ok(Self {
            root,
            dir,
            _temp: temp,
        })
    }

    /// Create a tree from `/`-separated relative paths. Entries ending in
    /// `/` are directories; everything else is an empty file.
    ///
    /// # Errors
    ///
    /// Fails when any entry cannot be created.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let tree = Self::new()?;
        for entry in entries {
            match entry.strip_suffix('/') {
                Some(dir) => tree.dir(dir)?,
                None => tree.file(entry, "")?,
            };
        }
        Ok(tree)
    }

    /// Create a directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created.
    pub fn dir(&self, path: &str) -> Result<&Self> {
        self.dir
            .create_dir_all(path)
            .with_context(|| format!("create directory {path}"))?;
        Ok(self)
    }

    /// Write a file, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Fails when the file or its parents cannot be created.
    pub fn file(&self, path: &str, contents: &str) -> Result<&Self> {
        if let Some(parent) = Utf8Path::new(path).parent().filter(|p| !p.as_str().is_empty()) {
            self.dir(parent.as_str())?;
        }
        self.dir
            .write(path, contents)
            .with_context(|| format!("write file {path}"))?;
        Ok(self)
    }

    /// Absolute path of the tree root.
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `relative` inside the tree.
    pub fn join(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}
