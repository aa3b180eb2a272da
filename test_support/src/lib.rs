//! Test utilities shared by the depglob unit and integration tests.
//!
//! - [`env`] serialises mutations of the process environment and restores
//!   variables on drop.
//! - [`shared_buffer`] provides in-memory writers that stand in for the
//!   parent build system's dependency channels.
//! - [`tree`] builds throwaway directory trees for glob tests.

pub mod env;
pub mod shared_buffer;
pub mod tree;

pub use env::{EnvLock, EnvScope};
pub use shared_buffer::{FailingWriter, SharedBuffer};
pub use tree::Tree;
