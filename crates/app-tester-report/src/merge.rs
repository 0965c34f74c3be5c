//! Merging result files
//!
//! Two merges with different guarantees:
//!
//! - [`merge_json`] is an outer merge onto a primary list. Records only
//!   present in the secondary list are dropped.
//! - [`merge_jsons`] / [`merge_multiple_jsons`] are union merges of the
//!   payload under one key. Every name from every input survives, and a
//!   device reported twice keeps the last value.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ReportError, Result};
use crate::{load_records, Record};

/// For each primary record, shallow-update it with the first secondary
/// record sharing the same `key` value.
pub fn merge_json(primary: &[Record], secondary: &[Record], key: &str) -> Vec<Record> {
    primary
        .iter()
        .map(|record| {
            let mut merged = record.clone();
            if let Some(id) = record.get(key) {
                if let Some(other) = secondary.iter().find(|o| o.get(key) == Some(id)) {
                    merged.extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            merged
        })
        .collect()
}

/// Union of the payloads under `key`, coalesced by name in first-seen order
#[derive(Debug, Default)]
struct UnionMerge {
    key: String,
    order: Vec<String>,
    payloads: HashMap<String, Value>,
}

impl UnionMerge {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, records: &[Record]) -> Result<()> {
        for (index, record) in records.iter().enumerate() {
            let name = record
                .get("name")
                .and_then(Value::as_str)
                .ok_or(ReportError::MissingName { index })?;

            let payload = record
                .get(&self.key)
                .cloned()
                .unwrap_or_else(|| Value::Object(Record::new()));

            match self.payloads.get_mut(name) {
                Some(existing) => update(existing, payload),
                None => {
                    self.order.push(name.to_string());
                    self.payloads.insert(name.to_string(), payload);
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<Record> {
        self.order
            .into_iter()
            .map(|name| {
                let payload = self.payloads.remove(&name).unwrap_or(Value::Null);
                let mut record = Record::new();
                record.insert("name".to_string(), Value::String(name));
                record.insert(self.key.clone(), payload);
                record
            })
            .collect()
    }
}

/// Shallow dict-update; anything that is not two objects is replaced
fn update(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(current), Value::Object(new)) => current.extend(new),
        (slot, new) => *slot = new,
    }
}

/// Union merge of two result lists on the payload under `key`
pub fn merge_jsons(first: &[Record], second: &[Record], key: &str) -> Result<Vec<Record>> {
    let mut merge = UnionMerge::new(key);
    merge.add(first)?;
    merge.add(second)?;
    Ok(merge.finish())
}

/// Union merge of several result files, in the given order
pub fn merge_multiple_jsons(files: &[PathBuf], key: &str) -> Result<Vec<Record>> {
    let mut merge = UnionMerge::new(key);
    for file in files {
        debug!(file = %file.display(), "merging");
        merge.add(&load_records(file)?)?;
    }
    Ok(merge.finish())
}

/// Expand a glob pattern, sorted, and union merge the matching files
pub fn merge_files(pattern: &str, key: &str) -> Result<(Vec<PathBuf>, Vec<Record>)> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => warn!(error = %e, "unreadable match, skipping"),
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ReportError::NoInputFiles(pattern.to_string()));
    }

    info!(pattern, count = files.len(), key, "merging result files");
    let merged = merge_multiple_jsons(&files, key)?;
    Ok((files, merged))
}
