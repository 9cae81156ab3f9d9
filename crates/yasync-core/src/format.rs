//! Plain-text rendering of daemon responses.

use chrono::DateTime;

use crate::types::LogResponse;

/// Render `system/log` messages, one per line.
///
/// Timestamps lose their fractional seconds:
/// `2014-09-18T12:59:26.549953186+02:00` becomes `2014-09-18 12:59:26+02:00`.
/// A timestamp that is not RFC 3339 is printed unchanged.
pub fn format_log(log: &LogResponse) -> String {
    let mut out = String::new();
    for msg in &log.messages {
        out.push_str(&format_timestamp(&msg.when));
        out.push_str(": ");
        out.push_str(&msg.message);
        out.push('\n');
    }
    out
}

fn format_timestamp(when: &str) -> String {
    match DateTime::parse_from_rfc3339(when) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
        Err(_) => when.to_string(),
    }
}
