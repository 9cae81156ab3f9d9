//! Static allow-lists of REST endpoints.
//!
//! The client only ever talks to endpoints listed here. Legality is decided
//! locally, before any request is built, and is never discovered from the
//! daemon.

use std::fmt;

use reqwest::Method;

/// Endpoints that may be requested with `GET`.
pub const GET_ENDPOINTS: &[&str] = &[
    "system/browse",
    "system/config",
    "system/config/insync",
    "system/connections",
    "system/debug",
    "system/discovery",
    "system/error",
    "system/log",
    "system/ping",
    "system/status",
    "system/upgrade",
    "system/version",
    "db/browse",
    "db/completion",
    "db/file",
    "db/ignores",
    "db/need",
    "db/status",
    "events",
    "stats/device",
    "stats/folder",
    "svc/deviceid",
    "svc/lang",
    "svc/random/string",
    "svc/report",
];

/// Endpoints that may be requested with `POST`.
pub const POST_ENDPOINTS: &[&str] = &[
    "system/config",
    "system/debug",
    "system/discovery",
    "system/error/clear",
    "system/error",
    "system/pause",
    "system/ping",
    "system/reset",
    "system/restart",
    "system/resume",
    "system/shutdown",
    "system/upgrade",
    "db/ignores",
    "db/override",
    "db/prio",
    "db/revert",
    "db/scan",
];

/// A REST endpoint as a normalized sequence of path segments.
///
/// Leading, trailing and repeated slashes are dropped, so `/system/status/`
/// and `system//status` are the same endpoint. Nothing else is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    path: String,
}

impl Endpoint {
    pub fn new(raw: &str) -> Self {
        let path = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self { path }
    }

    /// Slash-joined segments without a leading slash.
    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for Endpoint {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// The allow-list for `method`, or `None` if the method is not supported.
pub fn allowed_for(method: &Method) -> Option<&'static [&'static str]> {
    if *method == Method::GET {
        Some(GET_ENDPOINTS)
    } else if *method == Method::POST {
        Some(POST_ENDPOINTS)
    } else {
        None
    }
}

/// Whether `endpoint` may be requested with `method`.
pub fn is_allowed(method: &Method, endpoint: &Endpoint) -> bool {
    allowed_for(method).is_some_and(|list| list.contains(&endpoint.as_str()))
}
