//! Tests for command dispatch.

use super::*;
use anyhow::Result;
use clap::Parser;
use rstest::rstest;
use test_support::{EnvScope, Tree};

fn parse(args: &[&str]) -> Result<Cli> {
    Ok(Cli::try_parse_from(std::iter::once("depglob").chain(args.iter().copied()))?)
}

fn output(args: &[&str]) -> Result<(bool, String)> {
    let cli = parse(args)?;
    let mut out = Vec::new();
    let ok = execute(&cli, &mut out)?;
    Ok((ok, String::from_utf8(out)?))
}

#[rstest]
#[case(&["path", "norm", "a/./b/../c", "--style", "posix"], "a/c\n")]
#[case(&["path", "norm", "C:/x\\..\\y", "--style", "windows"], "C:\\y\n")]
#[case(&["path", "split", "a/b/c.txt", "--style", "posix"], "a/b\nc.txt\n")]
#[case(&["path", "components", "/usr/lib", "--style", "posix"], "/\nusr\nlib\n")]
#[case(&["path", "ext", "archive.tar.gz", "--style", "posix"], ".tar.gz\n")]
#[case(&["path", "root", "\\\\srv\\share\\x", "--style", "windows"], "\\\\srv\\share\n")]
#[case(&["path", "root", "rel/x", "--style", "posix"], "\n")]
fn path_commands_print_results(#[case] args: &[&str], #[case] expected: &str) -> Result<()> {
    let (ok, text) = output(args)?;
    assert!(ok);
    assert_eq!(text, expected);
    Ok(())
}

#[rstest]
#[case(&["match", "main.c", "*.c"], true)]
#[case(&["match", "main.h", "*.c"], false)]
#[case(&["match", "MAIN.C", "*.c"], false)]
#[case(&["match", "-i", "MAIN.C", "*.c"], true)]
fn match_reports_outcome(#[case] args: &[&str], #[case] expected: bool) -> Result<()> {
    let (ok, text) = output(args)?;
    assert_eq!(ok, expected);
    assert_eq!(text, format!("{expected}\n"));
    Ok(())
}

#[rstest]
#[case(&[])]
#[case(&["--serial"])]
#[case(&["-j", "3"])]
fn glob_prints_sorted_union(#[case] mode: &[&str]) -> Result<()> {
    let _env = EnvScope::isolated();
    let tree = Tree::with_entries(["src/a.c", "src/b.h", "build/", "src/sub/c.c"])?;
    let mut args = vec!["-C", tree.path().as_str()];
    args.extend_from_slice(mode);
    args.extend(["glob", "**/*.c", "src/*", "!src/b.h"]);
    let (ok, text) = output(&args)?;
    assert!(ok);
    assert_eq!(text, "src/a.c\nsrc/sub/c.c\n");
    Ok(())
}

#[test]
fn missing_root_is_a_runner_error() -> Result<()> {
    let _env = EnvScope::isolated();
    let tree = Tree::new()?;
    let missing = tree.join("absent");
    let cli = parse(&["-C", missing.as_str(), "glob", "*"])?;
    let Err(err) = execute(&cli, &mut Vec::new()) else {
        panic!("expected a missing root to fail");
    };
    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::RootNotFound { path }) if path == missing.as_str()
    ));
    Ok(())
}

#[rstest]
#[case(&["-j", "0", "glob", "*"])]
#[case(&["-j", "65", "glob", "*"])]
#[case(&["-j", "many", "glob", "*"])]
#[case(&["glob"])]
fn invalid_arguments_are_rejected(#[case] args: &[&str]) {
    let _env = EnvScope::isolated();
    assert!(parse(args).is_err());
}

#[test]
fn serial_overrides_jobs() -> Result<()> {
    let _env = EnvScope::isolated();
    let cli = parse(&["-j", "8", "--serial", "glob", "*"])?;
    assert_eq!(worker_count(&cli), None);
    let cli = parse(&["-j", "8", "glob", "*"])?;
    assert_eq!(worker_count(&cli), Some(8));
    Ok(())
}

#[test]
fn jobs_fall_back_to_environment() -> Result<()> {
    let mut env = EnvScope::isolated();
    env.set(deps_env::JOBS_ENV, "2");
    let cli = parse(&["glob", "*"])?;
    assert_eq!(cli.jobs, Some(2));
    Ok(())
}
