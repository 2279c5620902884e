//! Presync Integration
//!
//! An [`Integration`] binds an [`Agent`](presync_bridge::Agent) to a
//! workspace root. It owns one namespace directory under each of the
//! agent's rule and prompt roots, writes packages into it and removes it
//! again on [`Integration::clean`].

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

mod writer;

pub use writer::{Integration, IGNORE_MARKER, IGNORE_MARKER_CONTENT};
