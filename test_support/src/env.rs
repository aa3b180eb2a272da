//! Scoped environment mutation for tests.
//!
//! `std::env::set_var` and `remove_var` are `unsafe` in Rust 2024 because
//! they mutate process-global state. [`EnvScope`] holds the global
//! [`EnvLock`] for its whole lifetime, so every change made through it is
//! serialised against other tests, and it restores each touched variable
//! when dropped.
//!
//! # Examples
//!
//! ```rust,ignore
//! use deps_env::INPUTS_ENV;
//! use test_support::EnvScope;
//!
//! let mut scope = EnvScope::new();
//! scope.set(INPUTS_ENV, "7");
//! assert_eq!(std::env::var(INPUTS_ENV).ok().as_deref(), Some("7"));
//! // Dropping `scope` restores the previous value.
//! ```

use std::ffi::OsString;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use deps_env::{INPUTS_ENV, JOBS_ENV, OUTPUTS_ENV};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// RAII guard that holds the global environment lock.
pub struct EnvLock {
    _guard: MutexGuard<'static, ()>,
}

impl EnvLock {
    /// Acquire the lock, recovering it if a previous holder panicked.
    pub fn acquire() -> Self {
        let guard = ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self { _guard: guard }
    }
}

impl fmt::Debug for EnvLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvLock").finish_non_exhaustive()
    }
}

/// Records the original value of every variable it changes.
#[derive(Debug)]
pub struct EnvScope {
    saved: Vec<(&'static str, Option<OsString>)>,
    _lock: EnvLock,
}

impl EnvScope {
    /// Take the environment lock without changing anything yet.
    pub fn new() -> Self {
        Self {
            saved: Vec::new(),
            _lock: EnvLock::acquire(),
        }
    }

    /// Take the lock and clear every variable depglob reads, so tests start
    /// from a process with no parent build system.
    pub fn isolated() -> Self {
        let mut scope = Self::new();
        for name in [INPUTS_ENV, OUTPUTS_ENV, JOBS_ENV] {
            scope.remove(name);
        }
        scope
    }

    /// Set `name` to `value` until the scope ends.
    pub fn set(&mut self, name: &'static str, value: &str) -> &mut Self {
        self.remember(name);
        // SAFETY: `self` holds `EnvLock`, serialising environment mutation.
        unsafe { std::env::set_var(name, value) };
        self
    }

    /// Remove `name` until the scope ends.
    pub fn remove(&mut self, name: &'static str) -> &mut Self {
        self.remember(name);
        // SAFETY: `self` holds `EnvLock`, serialising environment mutation.
        unsafe { std::env::remove_var(name) };
        self
    }

    fn remember(&mut self, name: &'static str) {
        if self.saved.iter().all(|(saved, _)| *saved != name) {
            self.saved.push((name, std::env::var_os(name)));
        }
    }
}

impl Default for EnvScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (name, previous) in self.saved.drain(..).rev() {
            // SAFETY: the lock is still held; `_lock` drops after this body.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}
