use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::diff::diff_json;
use crate::protocol::set_dps_data;
use crate::types::RawWrite;

pub enum MessageLogMode {
    Full,
    Diffed,
}

/// NDJSON log of datapoint traffic for one device.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_state: Option<Value>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_state: None,
        })
    }

    pub fn log_command(&mut self, action: &str, sequence: Uuid, argument: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "seq": sequence.to_string(),
            "arg": argument,
        });
        self.write_line(&entry);
    }

    pub fn log_write(&mut self, sequence: Uuid, write: &RawWrite) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "write",
            "seq": sequence.to_string(),
            "body": set_dps_data(write),
            "settle_ms": write.settle.map(|d| d.as_millis() as u64),
        });
        self.write_line(&entry);
    }

    /// `dps` is the merged datapoint cache after applying the snapshot.
    pub fn log_snapshot(&mut self, dps: &Value) {
        match self.mode {
            MessageLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "snapshot",
                    "dps": dps,
                });
                self.write_line(&entry);
            }
            MessageLogMode::Diffed => {
                let entry = match &self.previous_state {
                    None => json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "snapshot",
                        "full": true,
                        "dps": dps,
                    }),
                    Some(prev) => {
                        let mut changes = Vec::new();
                        diff_json(prev, dps, "", &mut changes);

                        let change_entries: Vec<Value> = changes
                            .iter()
                            .map(|(path, old, new)| json!({ "dp": path, "old": old, "new": new }))
                            .collect();

                        json!({
                            "ts": Utc::now().to_rfc3339(),
                            "dir": "snapshot",
                            "changes": change_entries,
                        })
                    }
                };
                self.write_line(&entry);
                self.previous_state = Some(dps.clone());
            }
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
