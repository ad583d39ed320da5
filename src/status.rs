use crate::error::{MonitorError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Record marker for client entries in a status-version-2 log.
const CLIENT_LIST_MARKER: &str = "CLIENT_LIST";

// 0-indexed field positions within a CLIENT_LIST record.
const FIELD_BYTES_RECEIVED: usize = 5;
const FIELD_BYTES_SENT: usize = 6;
const FIELD_USERNAME: usize = 9;

/// One connected user's cumulative byte counters as last observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// All sessions observed in one read cycle, keyed by username.
pub type Snapshot = HashMap<String, Session>;

/// Read a status log and extract the snapshot of connected sessions.
///
/// The file is read in full on every call; the VPN daemon rewrites it on
/// its own status period, so no handle is kept across cycles.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let content = fs::read_to_string(path)?;
    Ok(parse_status(&content))
}

fn parse_status(content: &str) -> Snapshot {
    let mut snapshot = Snapshot::new();

    for line in content.lines() {
        let line = line.trim();
        if !line.starts_with(CLIENT_LIST_MARKER) {
            continue;
        }
        match parse_client_entry(line) {
            Ok(session) => {
                snapshot.insert(session.username.clone(), session);
            }
            // One bad record must not lose the rest of the file
            Err(e) => warn!("Skipping client entry: {}", e),
        }
    }

    snapshot
}

fn parse_client_entry(line: &str) -> Result<Session> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() <= FIELD_USERNAME {
        return Err(MonitorError::MalformedEntry(format!(
            "expected at least {} fields, got {}",
            FIELD_USERNAME + 1,
            fields.len()
        )));
    }

    Ok(Session {
        username: fields[FIELD_USERNAME].to_string(),
        bytes_received: parse_counter(fields[FIELD_BYTES_RECEIVED], "bytes received")?,
        bytes_sent: parse_counter(fields[FIELD_BYTES_SENT], "bytes sent")?,
    })
}

fn parse_counter(field: &str, name: &str) -> Result<u64> {
    field
        .parse::<u64>()
        .map_err(|_| MonitorError::MalformedEntry(format!("{} is not a number: {:?}", name, field)))
}
