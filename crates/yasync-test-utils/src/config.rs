//! Configuration file builders for tests.
//!
//! Use [`TestConfigBuilder`] to render a daemon `config.xml` without
//! repeating XML boilerplate across crate boundaries.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Fluent builder for a daemon `config.xml`.
///
/// # Example
///
/// ```ignore
/// let tmp = tempfile::TempDir::new().unwrap();
/// let path = TestConfigBuilder::new()
///     .address("127.0.0.1:8384")
///     .api_key("secret")
///     .folder("/home/alice", "abcde-12345", "Alice")
///     .write_to(tmp.path());
/// ```
#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    address: Option<String>,
    api_key: Option<String>,
    folders: Vec<(String, String, String)>,
}

impl TestConfigBuilder {
    /// Start with the daemon's stock GUI address and a fixed API key.
    pub fn new() -> Self {
        Self {
            address: Some("127.0.0.1:8384".to_string()),
            api_key: Some("test-api-key".to_string()),
            folders: Vec::new(),
        }
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Leave `<address>` out of the `<gui>` section.
    pub fn without_address(mut self) -> Self {
        self.address = None;
        self
    }

    /// Leave `<apikey>` out of the `<gui>` section.
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    /// Append a `<folder>` entry. Order of calls is the file order.
    pub fn folder(mut self, path: &str, id: &str, label: &str) -> Self {
        self.folders
            .push((path.to_string(), id.to_string(), label.to_string()));
        self
    }

    /// Render the XML document.
    pub fn render(&self) -> String {
        let mut xml = String::from("<configuration version=\"37\">\n");
        xml.push_str("    <!-- generated for tests -->\n");
        for (path, id, label) in &self.folders {
            xml.push_str(&format!(
                "    <folder id=\"{}\" label=\"{}\" path=\"{}\" type=\"sendreceive\"></folder>\n",
                escape(id),
                escape(label),
                escape(path)
            ));
        }
        xml.push_str("    <gui enabled=\"true\" tls=\"false\">\n");
        if let Some(address) = &self.address {
            xml.push_str(&format!("        <address>{}</address>\n", escape(address)));
        }
        if let Some(key) = &self.api_key {
            xml.push_str(&format!("        <apikey>{}</apikey>\n", escape(key)));
        }
        xml.push_str("    </gui>\n</configuration>\n");
        xml
    }

    /// Write `config.xml` into `dir` and return its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("config.xml");
        std::fs::write(&path, self.render()).expect("failed to write test config");
        path
    }

    /// Write `config.xml` into a fresh temporary directory.
    ///
    /// The directory is removed when the returned [`TempDir`] is dropped.
    pub fn write_temp(&self) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = self.write_to(dir.path());
        (dir, path)
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
