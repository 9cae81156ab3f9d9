//! Request dispatch against the daemon's REST API.
//!
//! A [`Dispatcher`] borrows a resolved [`SessionDescriptor`] and sends one
//! request per call to `<base-url>/rest/<endpoint>` with the API key header
//! attached. Endpoint legality is checked before anything touches the
//! network.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use yasync_config::SessionDescriptor;

use crate::build_info;
use crate::endpoint::{self, Endpoint};

/// Header carrying the API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Request timeout used when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from dispatching a request.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("HTTP method {0} is not supported by this client")]
    UnsupportedMethod(Method),

    #[error("{endpoint:?} is not a legal {method} endpoint")]
    IllegalEndpoint { method: Method, endpoint: String },

    #[error("API key contains characters that cannot be sent in a header")]
    InvalidCredential,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("cannot connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} rejected the API key ({status})")]
    Auth { url: String, status: StatusCode },

    #[error("{url} returned {status}: {body}")]
    Upstream {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// What to do with a non-2xx status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Turn it into [`DispatchError::Auth`] or [`DispatchError::Upstream`].
    Escalate,
    /// Hand it back in the [`Reply`].
    Inspect,
}

/// Status and decoded body of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    /// `null` for an empty body, a JSON string for a non-JSON body.
    pub body: Value,
}

/// Sends requests on behalf of one session.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    session: &'a SessionDescriptor,
    client: Client,
}

impl<'a> Dispatcher<'a> {
    pub fn new(session: &'a SessionDescriptor) -> Result<Self, DispatchError> {
        let mut key = HeaderValue::from_str(session.credential().expose())
            .map_err(|_| DispatchError::InvalidCredential)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(build_info::USER_AGENT)
            .build()
            .map_err(DispatchError::Client)?;

        Ok(Self { session, client })
    }

    pub fn session(&self) -> &SessionDescriptor {
        self.session
    }

    /// Full URL for `endpoint`: `<base-url>/rest/<segments>`.
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("{}/rest/{}", self.session.base_url(), endpoint)
    }

    /// `GET` an allow-listed endpoint. Non-2xx statuses are errors.
    pub async fn get(
        &self,
        endpoint: &Endpoint,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<Value, DispatchError> {
        let reply = self
            .send(
                Method::GET,
                endpoint,
                params,
                timeout,
                StatusPolicy::Escalate,
            )
            .await?;
        Ok(reply.body)
    }

    /// `POST` an allow-listed endpoint.
    pub async fn post(
        &self,
        endpoint: &Endpoint,
        params: &[(String, String)],
        timeout: Duration,
        policy: StatusPolicy,
    ) -> Result<Reply, DispatchError> {
        self.send(Method::POST, endpoint, params, timeout, policy)
            .await
    }

    /// Send one request with any method.
    ///
    /// Only `GET` and `POST` are supported; every other method fails with
    /// [`DispatchError::UnsupportedMethod`]. Illegal endpoints fail with
    /// [`DispatchError::IllegalEndpoint`]. Neither case performs any I/O.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &Endpoint,
        params: &[(String, String)],
        timeout: Duration,
        policy: StatusPolicy,
    ) -> Result<Reply, DispatchError> {
        if endpoint::allowed_for(&method).is_none() {
            return Err(DispatchError::UnsupportedMethod(method));
        }
        if !endpoint::is_allowed(&method, endpoint) {
            warn!(%method, endpoint = %endpoint, "refusing illegal endpoint");
            return Err(DispatchError::IllegalEndpoint {
                method,
                endpoint: endpoint.to_string(),
            });
        }

        let url = self.url_for(endpoint);
        debug!(%method, %url, params = params.len(), ?timeout, "sending request");

        let response = self
            .client
            .request(method, &url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, &url, timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify(e, &url, timeout))?;
        debug!(%url, %status, bytes = text.len(), "received response");

        if !status.is_success() && policy == StatusPolicy::Escalate {
            return Err(status_error(url, status, text));
        }

        Ok(Reply {
            status,
            body: decode_body(&text),
        })
    }
}

/// Map a non-2xx status onto the error taxonomy.
pub fn status_error(url: String, status: StatusCode, body: String) -> DispatchError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        DispatchError::Auth { url, status }
    } else {
        DispatchError::Upstream {
            url,
            status,
            body: body.trim().to_string(),
        }
    }
}

fn classify(err: reqwest::Error, url: &str, timeout: Duration) -> DispatchError {
    if err.is_timeout() {
        DispatchError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else if err.is_connect() {
        DispatchError::Connection {
            url: url.to_string(),
            source: err,
        }
    } else {
        DispatchError::Request {
            url: url.to_string(),
            source: err,
        }
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
