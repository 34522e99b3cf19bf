//! Offline reconstruction of the audit streams
//!
//! Reads the JSON-lines files directly; no writer needs to be running.

use crate::error::{AuditError, Result, Stream};
use crate::event::{AccessEvent, SecurityEvent};
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn read_records<T: DeserializeOwned>(stream: Stream, path: &Path) -> Result<Vec<T>> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AuditError::io(stream, path, e)),
    };

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| AuditError::io(stream, path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| AuditError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Load every access record, oldest first; a missing file is an empty log
pub fn read_access_log(path: impl AsRef<Path>) -> Result<Vec<AccessEvent>> {
    read_records(Stream::Access, path.as_ref())
}

/// Load every security record, oldest first; a missing file is an empty log
pub fn read_security_log(path: impl AsRef<Path>) -> Result<Vec<SecurityEvent>> {
    read_records(Stream::Security, path.as_ref())
}

/// Access records by one user
pub fn entries_for_user<'a>(events: &'a [AccessEvent], user_id: &str) -> Vec<&'a AccessEvent> {
    events.iter().filter(|e| e.user_id == user_id).collect()
}

/// Access records of one action type
pub fn entries_for_action<'a>(events: &'a [AccessEvent], action: &str) -> Vec<&'a AccessEvent> {
    events.iter().filter(|e| e.action == action).collect()
}

/// Security records of one event type
pub fn events_of_type<'a>(events: &'a [SecurityEvent], event_type: &str) -> Vec<&'a SecurityEvent> {
    events.iter().filter(|e| e.event_type == event_type).collect()
}
