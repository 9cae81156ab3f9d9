//! GUI address parsing.
//!
//! The daemon writes its GUI listen address as `host:port`, but users pass
//! overrides in several shapes. All of these are accepted:
//!
//! ```text
//! 127.0.0.1:8384            -> http://127.0.0.1:8384
//! //127.0.0.1:8384          -> http://127.0.0.1:8384
//! https://127.0.0.1:8384/   -> https://127.0.0.1:8384
//! [::1]:8384                -> http://[::1]:8384
//! ```

use std::fmt;
use std::str::FromStr;

/// Scheme used when the address does not carry one.
pub const DEFAULT_SCHEME: &str = "http";

/// Errors produced while decomposing an address string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address {0:?} has an empty or invalid scheme")]
    InvalidScheme(String),

    #[error("address {0:?} has no host")]
    MissingHost(String),

    #[error("address {0:?} has an invalid host; IPv6 hosts must be in brackets")]
    InvalidHost(String),

    #[error("address {0:?} has no port")]
    MissingPort(String),

    #[error("address {0:?} has an invalid port")]
    InvalidPort(String),
}

/// A parsed `scheme://host:port` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    scheme: String,
    host: String,
    port: u16,
}

impl Address {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The base URL, `scheme://host:port`, with no trailing slash.
    pub fn base_url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("//") {
            (DEFAULT_SCHEME.to_string(), rest)
        } else if let Some((scheme, rest)) = trimmed.split_once("://") {
            if !is_valid_scheme(scheme) {
                return Err(AddressError::InvalidScheme(raw.to_string()));
            }
            (scheme.to_ascii_lowercase(), rest)
        } else {
            (DEFAULT_SCHEME.to_string(), trimmed)
        };

        // Anything after the authority (a trailing slash or path) is ignored.
        let authority = rest.split('/').next().unwrap_or(rest);
        if authority.ends_with(']') {
            return Err(AddressError::MissingPort(raw.to_string()));
        }
        let Some((host, port)) = authority.rsplit_once(':') else {
            return Err(AddressError::MissingPort(raw.to_string()));
        };
        if host.is_empty() {
            return Err(AddressError::MissingHost(raw.to_string()));
        }
        if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
            return Err(AddressError::InvalidHost(raw.to_string()));
        }
        if port.is_empty() {
            return Err(AddressError::MissingPort(raw.to_string()));
        }
        if !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::InvalidPort(raw.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| AddressError::InvalidPort(raw.to_string()))?;

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
