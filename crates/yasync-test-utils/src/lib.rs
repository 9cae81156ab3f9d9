#![deny(unsafe_code)]

//! Shared test utilities for the yasync workspace.
//!
//! Provides a builder for daemon configuration files, an in-process mock of
//! the daemon's REST API, and tracing helpers so that individual crate tests
//! stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! yasync-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod daemon;
pub mod tracing_setup;
