#![deny(unsafe_code)]

//! Daemon configuration parsing and session resolution for yasync-cli.
//!
//! Reads the `config.xml` written by the synchronization daemon, applies the
//! command-line overrides and produces an immutable [`SessionDescriptor`]:
//! the base URL, the API key and the table of monitored folders.
//!
//! Override precedence is strict: an explicit URL or API key always wins over
//! the file, and the two are independent of each other.

/// GUI address parsing and normalization.
pub mod address;
/// Zeroizing API key wrapper.
pub mod credential;
/// Ordered table of monitored folders.
pub mod folders;
/// Home expansion and symlink-free absolute paths.
pub mod paths;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use address::{Address, AddressError};
pub use credential::Credential;
pub use folders::{FolderEntry, FolderTable};

/// Default location of the daemon configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/syncthing/config.xml";

/// Errors that can occur while resolving a session from a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("configuration is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("folder entry #{index} is invalid: {reason}")]
    InvalidFolder { index: usize, reason: String },

    #[error("invalid GUI address: {0}")]
    Address(#[from] AddressError),
}

impl ConfigError {
    /// Whether this error means the file exists but its content is unusable.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Xml(_) | ConfigError::MissingField(_) | ConfigError::InvalidFolder { .. }
        )
    }
}

/// Values supplied on the command line that supersede the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replacement for `gui/address`, in any accepted address form.
    pub url: Option<String>,
    /// Replacement for `gui/apikey`.
    pub api_key: Option<String>,
}

impl Overrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Everything needed to talk to one daemon, resolved once per invocation.
///
/// Immutable after construction; accessors hand out borrows only.
#[derive(Debug, Clone)]
pub struct SessionDescriptor {
    config_path: PathBuf,
    address: Address,
    credential: Credential,
    folders: FolderTable,
}

impl SessionDescriptor {
    /// Resolve a session from the configuration file at `path`.
    ///
    /// `path` may use `~` and may be relative; it is normalized before use.
    pub fn resolve(path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let config_path = paths::normalize(path);
        if !config_path.is_file() {
            return Err(ConfigError::NotFound(config_path));
        }

        debug!(path = %config_path.display(), "reading daemon configuration");
        let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;

        Self::from_xml(config_path, &content, overrides)
    }

    /// Build a session from configuration XML already in memory.
    ///
    /// `config_path` is recorded as-is; it is only used for display.
    pub fn from_xml(
        config_path: PathBuf,
        xml: &str,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();

        let gui = root
            .children()
            .find(|n| n.has_tag_name("gui"))
            .ok_or(ConfigError::MissingField("gui"))?;
        let file_address = required_text(gui, "address", "gui/address")?;
        let file_api_key = required_text(gui, "apikey", "gui/apikey")?;

        let raw_address = overrides.url.as_deref().unwrap_or(file_address);
        let address: Address = raw_address.parse()?;
        if overrides.url.is_some() {
            debug!(url = %address, "using URL override");
        }

        let credential = match &overrides.api_key {
            Some(key) => {
                debug!("using API key override");
                Credential::new(key.as_str())
            }
            None => Credential::new(file_api_key),
        };

        let mut folders = FolderTable::new();
        for (index, node) in root
            .children()
            .filter(|n| n.has_tag_name("folder"))
            .enumerate()
        {
            let invalid = |reason: &str| ConfigError::InvalidFolder {
                index,
                reason: reason.to_string(),
            };
            let id = node
                .attribute("id")
                .ok_or_else(|| invalid("missing `id` attribute"))?;
            let path = node
                .attribute("path")
                .filter(|p| !p.is_empty())
                .ok_or_else(|| invalid("missing `path` attribute"))?;
            let label = node.attribute("label").unwrap_or_default();

            folders.insert(
                Path::new(path),
                FolderEntry {
                    id: id.to_string(),
                    label: label.to_string(),
                },
            );
        }

        debug!(
            url = %address,
            folders = folders.len(),
            "resolved session descriptor"
        );

        Ok(Self {
            config_path,
            address,
            credential,
            folders,
        })
    }

    /// Absolute path of the configuration file this session came from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// `scheme://host:port`.
    pub fn base_url(&self) -> String {
        self.address.base_url()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn folders(&self) -> &FolderTable {
        &self.folders
    }
}

/// Text content of the first child element named `name`.
///
/// An element that is present but empty yields `Some("")`.
fn child_text<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .map(|n| n.text().unwrap_or_default())
}

/// Like [`child_text`], failing with [`ConfigError::MissingField`] when absent.
fn required_text<'a>(
    node: roxmltree::Node<'a, '_>,
    name: &str,
    field: &'static str,
) -> Result<&'a str, ConfigError> {
    match child_text(node, name) {
        Some(text) => Ok(text),
        None => Err(ConfigError::MissingField(field)),
    }
}

/// Sectioned, human-readable rendering used by `show`.
///
/// This prints the API key in clear text.
impl fmt::Display for SessionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const INDENT: &str = "  ";

        writeln!(f, "[Config path]")?;
        writeln!(f)?;
        writeln!(f, "{INDENT}{}", self.config_path.display())?;
        writeln!(f)?;

        writeln!(f, "[GUI info]")?;
        writeln!(f)?;
        writeln!(f, "{:<28}{}", format!("{INDENT}Address:"), self.address)?;
        writeln!(
            f,
            "{:<28}{}",
            format!("{INDENT}API Key:"),
            self.credential.expose()
        )?;
        writeln!(f)?;

        writeln!(f, "[Folders]")?;
        for (path, folder) in self.folders.iter() {
            writeln!(f)?;
            writeln!(f, "{INDENT}- {}", path.display())?;
            writeln!(f, "{INDENT}{INDENT}ID: {}", folder.id)?;
            writeln!(f, "{INDENT}{INDENT}Label: {}", folder.label)?;
        }
        Ok(())
    }
}
