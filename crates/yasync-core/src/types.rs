//! Response bodies the flows decode from the daemon.
//!
//! Only the fields this client reads are modelled; everything else in the
//! daemon's JSON is ignored.

use serde::Deserialize;

/// `GET system/log`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogResponse {
    #[serde(default)]
    pub messages: Vec<LogMessage>,
}

/// One recent log line held by the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct LogMessage {
    /// RFC 3339 timestamp with nanosecond precision.
    pub when: String,
    pub message: String,
}

/// `GET system/config`, reduced to what `check` compares.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub folders: Vec<RemoteFolder>,
}

/// A folder as the running daemon knows it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFolder {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remote_config_ignores_unknown_fields() {
        let body = serde_json::json!({
            "version": 37,
            "folders": [
                { "id": "abcde-12345", "label": "Docs", "path": "/home/alice/docs",
                  "type": "sendreceive", "devices": [] }
            ],
            "devices": [{ "deviceID": "AAAA" }],
            "gui": { "address": "127.0.0.1:8384", "apiKey": "k", "theme": "dark" },
            "options": {}
        });
        let config: RemoteConfig = serde_json::from_value(body).unwrap();
        assert_eq!(
            config.folders,
            vec![RemoteFolder {
                id: "abcde-12345".into(),
                label: "Docs".into(),
                path: "/home/alice/docs".into(),
            }]
        );
    }

    #[test]
    fn test_missing_label_defaults_to_empty() {
        let body = serde_json::json!({ "folders": [{ "id": "x", "path": "/srv/x" }] });
        let config: RemoteConfig = serde_json::from_value(body).unwrap();
        assert_eq!(config.folders[0].label, "");
    }

    #[test]
    fn test_log_response_ignores_level() {
        let body = serde_json::json!({
            "messages": [{ "when": "2021-01-02T03:04:05Z", "message": "hi", "level": 2 }]
        });
        let log: LogResponse = serde_json::from_value(body).unwrap();
        assert_eq!(log.messages[0].message, "hi");
    }

    #[test]
    fn test_log_response_empty() {
        let log: LogResponse = serde_json::from_str("{}").unwrap();
        assert!(log.messages.is_empty());
    }
}
