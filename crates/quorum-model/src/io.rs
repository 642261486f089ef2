//! Feed snapshot I/O and atomic file operations

use crate::feeds::{FeedError, FeedKind};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a whole-file JSON feed snapshot
pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path, feed: FeedKind) -> Result<T, FeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FeedError::Io { feed, source })?;
    serde_json::from_str(&contents).map_err(|source| FeedError::Parse { feed, source })
}

/// Read records from a JSONL dump, skipping malformed lines
pub fn read_jsonl<T: for<'de> Deserialize<'de>>(
    path: &Path,
    feed: FeedKind,
) -> Result<Vec<T>, FeedError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(|source| FeedError::Io { feed, source })?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|source| FeedError::Io { feed, source })?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(_) => continue, // Skip malformed lines
        }
    }

    Ok(records)
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

/// Serialize a value to pretty JSON and write it atomically
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())?;
    Ok(())
}
