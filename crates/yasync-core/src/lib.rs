#![deny(unsafe_code)]

//! Request layer of yasync-cli.
//!
//! Takes a resolved [`SessionDescriptor`] and turns subcommands into single
//! REST calls against the synchronization daemon: allow-listed endpoints,
//! folder lookup for rescans, and the `log`/`scan`/`check` flows.
//!
//! Every invocation is one resolve-then-request cycle; nothing here keeps
//! state between calls.

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Local configuration vs. running daemon comparison.
pub mod check;
/// HTTP dispatch with the API key header and timeout handling.
pub mod dispatch;
/// GET/POST endpoint allow-lists.
pub mod endpoint;
/// Text rendering of daemon responses.
pub mod format;
/// Filesystem path to folder ID lookup.
pub mod locate;
/// The `log`, `scan` and `check` flows.
pub mod ops;
/// Response bodies decoded from the daemon.
pub mod types;

pub use check::{CheckReport, Discrepancy};
pub use dispatch::{DEFAULT_TIMEOUT, DispatchError, Dispatcher, Reply, StatusPolicy};
pub use endpoint::Endpoint;
pub use locate::{FolderLocation, LocateError};
pub use yasync_config::{ConfigError, Overrides, SessionDescriptor};

/// Any failure a subcommand can run into.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
}
