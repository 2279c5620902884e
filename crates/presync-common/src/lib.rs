//! Presync Common
//!
//! Primitives the loader and writers build on:
//!
//! - Filesystem helpers: ensure a directory, write a file atomically,
//!   remove a tree that may not exist
//! - [`FanOut`]: run independent tasks concurrently and join them with
//!   "first error wins" semantics under an explicit [`ErrorPolicy`]

#![deny(missing_docs)]

pub mod fanout;
pub mod fs;

pub use fanout::{ErrorPolicy, FanOut};
pub use fs::{ensure_dir, is_dir_exists, remove_dir_all_if_exists, write_atomic};
