use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

/// How device responses are written to the message log: the raw body as
/// received, or the decoded key/value map.
pub enum MessageLogMode {
    Raw,
    Decoded,
}

pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { mode, file })
    }

    pub fn log_command(&mut self, action: &str, detail: Option<&str>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "detail": detail,
        });
        self.write_line(&entry);
    }

    pub fn log_request(&mut self, kind: &str, url: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "kind": kind,
            "url": url,
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, body: &str, fields: &HashMap<String, String>) {
        let entry = match self.mode {
            MessageLogMode::Raw => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "resp",
                "body": body,
            }),
            MessageLogMode::Decoded => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "resp",
                "fields": fields,
            }),
        };
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
