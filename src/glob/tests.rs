//! Tests for the component matcher and pattern expansion.

use super::*;
use crate::deps::{Dependency, DependencyReporter};
use crate::path::{CaseSensitivity, PathStyle};
use anyhow::Result;
use rstest::{fixture, rstest};
use std::sync::Mutex;
use test_support::{SharedBuffer, Tree};

const SENSITIVE: CaseSensitivity = CaseSensitivity::Sensitive;

#[rstest]
#[case("anything", "*")]
#[case("", "*")]
#[case("ab", "a?")]
#[case("ay", "a[xy]")]
#[case("az", "a[!xy]")]
#[case("main.c", "*.c")]
#[case("a.b.c", "*.*.c")]
#[case("abc", "a*c")]
#[case("ac", "a*c")]
#[case("abcbd", "a*b?")]
#[case("x]", "x]")]
#[case("a", "[a]")]
fn matcher_accepts(#[case] name: &str, #[case] pattern: &str) {
    assert!(glob_match(name, pattern, SENSITIVE), "{name:?} ~ {pattern:?}");
}

#[rstest]
#[case("ab", "a[xy]")]
#[case("ax", "a[!xy]")]
#[case("a", "a?")]
#[case("abc", "a*d")]
#[case("", "?")]
#[case("a", "a[")]
#[case("a", "a[x")]
#[case("ab", "a[]b")]
#[case("a", "")]
#[case("Main.c", "main.c")]
fn matcher_rejects(#[case] name: &str, #[case] pattern: &str) {
    assert!(!glob_match(name, pattern, SENSITIVE), "{name:?} !~ {pattern:?}");
}

#[test]
fn insensitive_matching_folds_ascii_case() {
    let case = CaseSensitivity::Insensitive;
    assert!(glob_match("README.TXT", "readme.*", case));
    assert!(glob_match("X", "[x]", case));
    assert!(!glob_match("Y", "[!y]", case));
}

#[test]
fn matcher_handles_multibyte_names() {
    assert!(glob_match("héllo", "h?llo", SENSITIVE));
    assert!(glob_match("日本.txt", "*.txt", SENSITIVE));
}

#[rstest]
#[case("*.c", true)]
#[case("a?", true)]
#[case("[ab]", true)]
#[case("**", true)]
#[case("plain.txt", false)]
#[case("", false)]
fn classifies_glob_components(#[case] component: &str, #[case] expected: bool) {
    assert_eq!(is_glob_pattern(component), expected);
}

#[test]
fn only_double_star_is_recursive() {
    assert!(is_recursive_glob("**"));
    assert!(!is_recursive_glob("***"));
    assert!(!is_recursive_glob("*"));
}

#[fixture]
fn tree() -> Tree {
    Tree::with_entries([
        "a/b/c.txt",
        "a/b/d.rs",
        "a/top.txt",
        "a/empty/",
        "src/a.c",
        "src/b.h",
        "build/",
        "README",
    ])
    .unwrap_or_else(|err| panic!("tree fixture: {err}"))
}

fn posix_cache() -> Arc<DirCache> {
    Arc::new(DirCache::new().with_style(PathStyle::Posix))
}

fn paths(found: &[GlobMatch]) -> Vec<&str> {
    found.iter().map(|m| m.path.as_str()).collect()
}

#[rstest]
#[case("src/*.c", &["src/a.c"])]
#[case("src/*", &["src/a.c", "src/b.h"])]
#[case("*/", &["a", "build", "src"])]
#[case("a/**/*.txt", &["a/b/c.txt", "a/top.txt"])]
#[case("a/**", &["a/b/c.txt", "a/b/d.rs", "a/top.txt"])]
#[case("a/**/", &["a", "a/b", "a/empty"])]
#[case("**/*.rs", &["a/b/d.rs"])]
#[case("a/*/c.txt", &["a/b/c.txt"])]
#[case("README", &["README"])]
#[case("a/b/", &["a/b"])]
#[case("missing", &[])]
#[case("a/b", &[])]
#[case("src/[ab].?", &["src/a.c", "src/b.h"])]
#[case("src/[!a]*", &["src/b.h"])]
#[case("nowhere/*.c", &[])]
#[case("missing/**/", &[])]
#[case("README/**/", &[])]
#[case("a/b/c.txt/**/", &[])]
#[case("src/**/", &["src"])]
fn expands_patterns(tree: Tree, #[case] pattern: &str, #[case] expected: &[&str]) {
    let globber = Globber::new(posix_cache());
    let found = globber.matches(tree.path().as_str(), pattern);
    assert_eq!(paths(&found), expected, "pattern {pattern:?}");
}

#[test]
fn recursive_glob_over_minimal_tree() -> Result<()> {
    let tree = Tree::with_entries(["a/b/c.txt"])?;
    let globber = Globber::new(posix_cache());
    let root = tree.path().as_str();
    assert_eq!(paths(&globber.matches(root, "a/**/")), ["a", "a/b"]);
    assert_eq!(paths(&globber.matches(root, "a/**/*.txt")), ["a/b/c.txt"]);
    Ok(())
}

#[rstest]
fn match_kinds_follow_trailing_separator(tree: Tree) {
    let globber = Globber::new(posix_cache());
    let root = tree.path().as_str();
    assert!(globber.matches(root, "a/*").iter().all(|m| !m.is_dir));
    assert!(globber.matches(root, "a/*/").iter().all(|m| m.is_dir));
}

#[rstest]
fn absolute_patterns_yield_absolute_paths(tree: Tree) {
    let globber = Globber::new(posix_cache());
    let pattern = format!("{}/src/*.h", tree.path());
    let found = globber.matches("/unrelated", &pattern);
    assert_eq!(paths(&found), [format!("{}/src/b.h", tree.path())]);
}

#[rstest]
#[case(1)]
#[case(4)]
fn pool_expansion_matches_sequential(tree: Tree, #[case] threads: usize) -> Result<()> {
    let pool = Arc::new(WorkerPool::new(threads)?);
    let root = tree.path().as_str();
    let sequential = Globber::new(posix_cache());
    let parallel = Globber::new(posix_cache()).with_pool(pool);
    for pattern in ["**/*", "**/", "a/**/*.txt", "*/*", "src/a.c"] {
        assert_eq!(
            parallel.matches(root, pattern),
            sequential.matches(root, pattern),
            "pattern {pattern:?}"
        );
    }
    Ok(())
}

#[rstest]
fn closures_act_as_sinks(tree: Tree) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let sink = move |path: &str, is_dir: bool| {
        if let Ok(mut guard) = recorder.lock() {
            guard.push((path.to_owned(), is_dir));
        }
    };
    Globber::new(posix_cache()).glob(tree.path().as_str(), "src/*.c", Arc::new(sink));
    let recorded = seen.lock().map(|guard| guard.clone()).unwrap_or_default();
    assert_eq!(recorded, [(String::from("src/a.c"), false)]);
}

#[rstest]
fn listed_directories_are_reported_once(tree: Tree) -> Result<()> {
    let buffer = SharedBuffer::new();
    let reporter = Arc::new(DependencyReporter::from_writers(Some(buffer.boxed()), None));
    let cache = Arc::new(
        DirCache::new()
            .with_style(PathStyle::Posix)
            .with_reporter(reporter),
    );
    let globber = Globber::new(Arc::clone(&cache));
    let root = tree.path().as_str();
    for _ in 0..3 {
        assert!(!globber.matches(root, "a/**/*.txt").is_empty());
    }

    let mut reported: Vec<String> = Dependency::decode_all(&buffer.contents())?
        .into_iter()
        .map(|record| String::from_utf8_lossy(&record.name).into_owned())
        .collect();
    reported.sort();
    let expected = ["a", "a/b", "a/empty"].map(|dir| format!("{root}/{dir}"));
    assert_eq!(reported, expected);
    assert_eq!(cache.len(), 3);
    Ok(())
}

#[rstest]
fn literal_components_skip_listing(tree: Tree) {
    let cache = posix_cache();
    let globber = Globber::new(Arc::clone(&cache));
    let found = globber.matches(tree.path().as_str(), "a/b/c.txt");
    assert_eq!(paths(&found), ["a/b/c.txt"]);
    assert!(cache.is_empty());
}

#[rstest]
fn glob_set_applies_exclusions_in_order(tree: Tree) {
    let globber = Globber::new(posix_cache());
    let root = tree.path().as_str();
    let set = GlobSet::new();
    set.extend(&globber, root, ["src/*", "!src/b.h", "a/*.txt"]);
    assert_eq!(set.to_vec(), ["a/top.txt", "src/a.c"]);
    assert!(set.contains("src/a.c"));
    assert!(!set.contains("src/b.h"));

    set.apply(&globber, root, "src/*.h");
    assert_eq!(set.len(), 3);
}

#[rstest]
fn glob_set_deduplicates(tree: Tree) {
    let globber = Globber::new(posix_cache());
    let set = GlobSet::new();
    set.extend(&globber, tree.path().as_str(), ["src/*.c", "src/a.*", "**/a.c"]);
    assert_eq!(set.to_vec(), ["src/a.c"]);
}
