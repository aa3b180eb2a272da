//! End-to-end expansion through the public API.
//!
//! These tests build real directory trees and check the sorted results of
//! include and exclude patterns, including a cross-check of recursive
//! expansion against an independent directory walker.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use depglob::deps::{Dependency, DependencyReporter};
use depglob::dircache::DirCache;
use depglob::glob::{GlobSet, Globber};
use depglob::path::PathStyle;
use depglob::pool::WorkerPool;
use rstest::{fixture, rstest};
use test_support::{SharedBuffer, Tree};
use walkdir::WalkDir;

#[fixture]
fn project() -> Tree {
    Tree::with_entries(["src/a.c", "src/b.h", "build/"])
        .unwrap_or_else(|err| panic!("project fixture: {err}"))
}

fn globber(threads: Option<usize>) -> Result<Globber> {
    let cache = Arc::new(DirCache::new().with_style(PathStyle::Posix));
    let globber = Globber::new(cache);
    Ok(match threads {
        Some(count) => globber.with_pool(Arc::new(WorkerPool::new(count)?)),
        None => globber,
    })
}

fn expand(globber: &Globber, root: &str, patterns: &[&str]) -> Vec<String> {
    let set = GlobSet::new();
    set.extend(globber, root, patterns.iter().copied());
    set.to_vec()
}

#[rstest]
#[case(&["src/*.c"], &["src/a.c"])]
#[case(&["**/*"], &["src/a.c", "src/b.h"])]
#[case(&["**/*", "!src/b.h"], &["src/a.c"])]
#[case(&["!src/b.h", "**/*"], &["src/a.c", "src/b.h"])]
#[case(&["*/"], &["build", "src"])]
#[case(&["build/*"], &[])]
fn project_expansion(
    project: Tree,
    #[values(None, Some(1), Some(4))] threads: Option<usize>,
    #[case] patterns: &[&str],
    #[case] expected: &[&str],
) -> Result<()> {
    let globber = globber(threads)?;
    let found = expand(&globber, project.path().as_str(), patterns);
    ensure!(
        found == expected,
        "patterns {patterns:?}: expected {expected:?}, got {found:?}"
    );
    Ok(())
}

#[test]
fn recursive_star_agrees_with_walkdir() -> Result<()> {
    let tree = Tree::with_entries([
        "one.txt",
        "a/two.txt",
        "a/b/three.rs",
        "a/b/c/d/four.md",
        "e/",
        "e/f/five",
    ])?;
    let root = tree.path();
    let mut walked = BTreeSet::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.context("walk tree")?;
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root)?;
            let text = relative.to_str().context("non-UTF-8 path")?;
            walked.insert(text.replace('\\', "/"));
        }
    }
    let globbed: BTreeSet<String> = expand(&globber(Some(3))?, root.as_str(), &["**/*"])
        .into_iter()
        .collect();
    ensure!(globbed == walked, "glob {globbed:?} != walk {walked:?}");
    Ok(())
}

#[rstest]
fn every_listed_directory_is_an_input(project: Tree) -> Result<()> {
    let buffer = SharedBuffer::new();
    let reporter = Arc::new(DependencyReporter::from_writers(Some(buffer.boxed()), None));
    let cache = Arc::new(
        DirCache::new()
            .with_style(PathStyle::Posix)
            .with_reporter(reporter),
    );
    let globber = Globber::new(cache).with_pool(Arc::new(WorkerPool::new(2)?));
    let root = project.path().as_str();
    let found = expand(&globber, root, &["**/*", "src/*.c"]);
    ensure!(found == ["src/a.c", "src/b.h"], "unexpected matches {found:?}");

    let reported: BTreeSet<String> = Dependency::decode_all(&buffer.contents())?
        .into_iter()
        .map(|record| String::from_utf8_lossy(&record.name).into_owned())
        .collect();
    let expected: BTreeSet<String> = [root.to_owned(), format!("{root}/build"), format!("{root}/src")]
        .into_iter()
        .collect();
    ensure!(reported == expected, "reported {reported:?}");
    Ok(())
}
