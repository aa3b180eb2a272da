//! Tests for memoisation, normalised keys, reporting and listing contents.

use super::*;
use anyhow::Result;
use crate::deps::Dependency;
use rstest::{fixture, rstest};
use test_support::{SharedBuffer, Tree};

#[fixture]
fn tree() -> Tree {
    Tree::with_entries(["b.txt", "a/", "a/inner.txt", "c/"])
        .unwrap_or_else(|err| panic!("tree fixture: {err}"))
}

fn reporting_cache(buffer: &SharedBuffer) -> DirCache {
    let reporter = DependencyReporter::from_writers(Some(buffer.boxed()), None);
    DirCache::new()
        .with_style(PathStyle::Posix)
        .with_reporter(Arc::new(reporter))
}

#[rstest]
fn listing_is_sorted_with_kinds(tree: Tree) {
    let cache = DirCache::new();
    let listing = cache.entries(tree.path().as_str());
    let names: Vec<(&str, bool)> = listing
        .iter()
        .map(|entry| (entry.name.as_str(), entry.is_dir))
        .collect();
    assert_eq!(names, [("a", true), ("b.txt", false), ("c", true)]);
}

#[rstest]
fn second_lookup_reuses_listing(tree: Tree) -> Result<()> {
    let cache = DirCache::new();
    let dir = tree.path().as_str();
    let first = cache.entries(dir);
    tree.file("late.txt", "")?;
    let second = cache.entries(dir);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(second.iter().all(|entry| entry.name != "late.txt"));
    assert_eq!(cache.len(), 1);
    Ok(())
}

#[rstest]
fn equivalent_spellings_share_one_entry(tree: Tree) -> Result<()> {
    let buffer = SharedBuffer::new();
    let cache = reporting_cache(&buffer);
    let root = tree.path().as_str();

    let plain = cache.entries(&format!("{root}/a"));
    let dotted = cache.entries(&format!("{root}/./a/"));
    let doubled = cache.entries_in(root, "c/../a");

    assert!(Arc::ptr_eq(&plain, &dotted));
    assert!(Arc::ptr_eq(&plain, &doubled));
    let reported = Dependency::decode_all(&buffer.contents())?;
    assert_eq!(reported, vec![Dependency::named(format!("{root}/a"))]);
    Ok(())
}

#[rstest]
fn each_directory_reported_once(tree: Tree) -> Result<()> {
    let buffer = SharedBuffer::new();
    let cache = reporting_cache(&buffer);
    let root = tree.path().as_str();
    for _ in 0..3 {
        assert_eq!(cache.entries(root).len(), 3);
        assert_eq!(cache.entries_in(root, "a").len(), 1);
    }
    let names: Vec<Vec<u8>> = Dependency::decode_all(&buffer.contents())?
        .into_iter()
        .map(|record| record.name)
        .collect();
    assert_eq!(
        names,
        [root.as_bytes().to_vec(), format!("{root}/a").into_bytes()]
    );
    Ok(())
}

#[rstest]
fn missing_directory_lists_as_empty(tree: Tree) {
    let cache = DirCache::new();
    let listing = cache.entries(tree.join("absent").as_str());
    assert!(listing.is_empty());
    assert_eq!(cache.len(), 1);
}

#[rstest]
fn concurrent_lookups_list_once(tree: Tree) -> Result<()> {
    let buffer = SharedBuffer::new();
    let cache = Arc::new(reporting_cache(&buffer));
    let root = tree.path().to_string();
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let root = root.clone();
            std::thread::spawn(move || cache.entries_in(&root, "a").len())
        })
        .collect();
    for handle in threads {
        assert_eq!(handle.join().ok(), Some(1));
    }
    assert_eq!(Dependency::decode_all(&buffer.contents())?.len(), 1);
    Ok(())
}

#[rstest]
fn path_kind_classifies(tree: Tree) {
    assert_eq!(path_kind(tree.join("a").as_str()), PathKind::Dir);
    assert_eq!(path_kind(tree.join("b.txt").as_str()), PathKind::File);
    assert_eq!(path_kind(tree.join("nope").as_str()), PathKind::Unknown);
}

#[cfg(unix)]
#[rstest]
fn symlinks_are_not_directories(tree: Tree) -> Result<()> {
    std::os::unix::fs::symlink(tree.join("a"), tree.join("link"))?;
    let cache = DirCache::new();
    let listing = cache.entries(tree.path().as_str());
    let link = listing.iter().find(|entry| entry.name == "link");
    assert_eq!(link.map(|entry| entry.is_dir), Some(false));
    assert_eq!(path_kind(tree.join("link").as_str()), PathKind::Unknown);
    Ok(())
}

#[test]
fn entries_sort_files_before_same_named_dirs() {
    let entries = DirEntries::from(vec![
        DirEntry {
            name: "x".into(),
            is_dir: true,
        },
        DirEntry {
            name: "x".into(),
            is_dir: false,
        },
        DirEntry {
            name: "a".into(),
            is_dir: true,
        },
    ]);
    let order: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.is_dir)).collect();
    assert_eq!(order, [("a", true), ("x", false), ("x", true)]);
}
