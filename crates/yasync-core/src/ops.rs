//! The flows behind the `log`, `scan` and `check` subcommands.
//!
//! Each flow performs at most one request through a [`Dispatcher`].

use std::path::Path;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::Error;
use crate::check::{self, CheckReport};
use crate::dispatch::{self, Dispatcher, StatusPolicy};
use crate::endpoint::Endpoint;
use crate::locate::{self, FolderLocation};
use crate::types::{LogResponse, RemoteConfig};

/// Fetch the daemon's recent log messages.
pub async fn fetch_log(
    dispatcher: &Dispatcher<'_>,
    timeout: Duration,
) -> Result<LogResponse, Error> {
    let endpoint = Endpoint::new("system/log");
    let body = dispatcher.get(&endpoint, &[], timeout).await?;
    decode(&endpoint, body)
}

/// Ask the daemon to rescan the folder (or sub-path) containing `target`.
///
/// Fails with a locate error before any request if `target` is outside all
/// monitored folders.
pub async fn scan(
    dispatcher: &Dispatcher<'_>,
    target: &Path,
    timeout: Duration,
) -> Result<FolderLocation, Error> {
    let location = locate::locate(dispatcher.session().folders(), target)?;

    let mut params = vec![("folder".to_string(), location.folder_id.clone())];
    if let Some(sub) = &location.sub_path {
        params.push(("sub".to_string(), sub.clone()));
    }

    dispatcher
        .post(
            &Endpoint::new("db/scan"),
            &params,
            timeout,
            StatusPolicy::Escalate,
        )
        .await?;

    info!(
        folder = %location.folder_id,
        sub = location.sub_path.as_deref().unwrap_or(""),
        "scan requested"
    );
    Ok(location)
}

/// Compare the local folder table with the daemon's running configuration.
///
/// The reply status is inspected here rather than escalated, so that a
/// rejected API key surfaces as [`DispatchError::Auth`] and an unreachable
/// daemon as [`DispatchError::Connection`].
///
/// [`DispatchError::Auth`]: crate::dispatch::DispatchError::Auth
/// [`DispatchError::Connection`]: crate::dispatch::DispatchError::Connection
pub async fn check(dispatcher: &Dispatcher<'_>, timeout: Duration) -> Result<CheckReport, Error> {
    let endpoint = Endpoint::new("system/config");
    let reply = dispatcher
        .send(Method::GET, &endpoint, &[], timeout, StatusPolicy::Inspect)
        .await?;

    if !reply.status.is_success() {
        let body = match &reply.body {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        let url = dispatcher.url_for(&endpoint);
        return Err(dispatch::status_error(url, reply.status, body).into());
    }

    let remote: RemoteConfig = decode(&endpoint, reply.body)?;
    Ok(check::compare(dispatcher.session().folders(), &remote))
}

fn decode<T: DeserializeOwned>(endpoint: &Endpoint, body: Value) -> Result<T, Error> {
    serde_json::from_value(body).map_err(|source| Error::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
