//! Presync Sync
//!
//! Ties the pieces together: [`Config`] describes the workspace and its
//! imports, a [`ContentFetcher`] brings each import into the package cache,
//! and [`SyncService`] loads the packages and writes them for every enabled
//! agent.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables)]

pub mod config;
pub mod fetch;
pub mod service;

pub use config::Config;
pub use fetch::{ContentFetcher, DefaultFetcher};
pub use service::{ApplyReport, SyncService};
